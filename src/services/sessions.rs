//! In-memory registry of wizard sessions.
//!
//! Each session holds one [`InspectionWizard`] behind an async mutex so a
//! session is driven by one request at a time. The cancel signal lives
//! outside the mutex, which lets closing a session abort uploads that are
//! still holding the lock.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tokio::time::interval;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::config::UploadSettings;
use crate::error::{AppError, AppResult};
use crate::services::wizard::{CancelSignal, FileStore, InspectionStore, InspectionWizard};

struct SessionEntry {
    owner: Uuid,
    wizard: Arc<Mutex<InspectionWizard>>,
    cancel: CancelSignal,
    last_used: Instant,
}

/// Session registry shared by all workers.
pub struct WizardSessions {
    store: Arc<dyn InspectionStore>,
    files: Arc<dyn FileStore>,
    limits: UploadSettings,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl WizardSessions {
    pub fn new(
        store: Arc<dyn InspectionStore>,
        files: Arc<dyn FileStore>,
        limits: UploadSettings,
    ) -> Self {
        Self {
            store,
            files,
            limits,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Open a wizard on a valve the caller can see. Returns the session id.
    pub async fn start(
        &self,
        ctx: &AuthContext,
        valve_id: Uuid,
    ) -> AppResult<(Uuid, Arc<Mutex<InspectionWizard>>)> {
        ctx.require_inspector()?;

        let valve = self
            .store
            .find_valve(ctx, valve_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Valve {}", valve_id)))?;

        let cancel = CancelSignal::new();
        let wizard = Arc::new(Mutex::new(InspectionWizard::new(
            ctx.clone(),
            valve.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.files),
            self.limits,
            cancel.clone(),
        )));

        let session_id = Uuid::new_v4();
        self.sessions.write().await.insert(
            session_id,
            SessionEntry {
                owner: ctx.profile_id,
                wizard: Arc::clone(&wizard),
                cancel,
                last_used: Instant::now(),
            },
        );

        info!(
            session_id = %session_id,
            valve = %valve.tag,
            profile = %ctx.profile_id,
            "Wizard session started"
        );
        Ok((session_id, wizard))
    }

    /// Look up a session owned by the caller and mark it as used.
    pub async fn get(
        &self,
        ctx: &AuthContext,
        session_id: Uuid,
    ) -> AppResult<Arc<Mutex<InspectionWizard>>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(&session_id)
            .filter(|entry| entry.owner == ctx.profile_id)
            .ok_or_else(|| AppError::NotFound(format!("Wizard session {}", session_id)))?;
        entry.last_used = Instant::now();
        Ok(Arc::clone(&entry.wizard))
    }

    /// Remove a session and cancel its in-flight uploads.
    pub async fn close(&self, ctx: &AuthContext, session_id: Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&session_id) {
            Some(entry) if entry.owner == ctx.profile_id => {}
            _ => return Err(AppError::NotFound(format!("Wizard session {}", session_id))),
        }
        if let Some(entry) = sessions.remove(&session_id) {
            entry.cancel.cancel();
        }
        info!(session_id = %session_id, "Wizard session closed");
        Ok(())
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_used.elapsed() < max_idle;
            if !keep {
                entry.cancel.cancel();
                info!(session_id = %id, "Evicting idle wizard session");
            }
            keep
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Start the idle-session eviction background task.
pub fn start_eviction_task(sessions: Arc<WizardSessions>, idle_minutes: u64) {
    tokio::spawn(async move {
        let max_idle = Duration::from_secs(idle_minutes * 60);
        let period = Duration::from_secs((idle_minutes * 60 / 4).clamp(30, 900));
        info!(
            "Starting wizard session eviction (idle: {} minutes, interval: {} seconds)",
            idle_minutes,
            period.as_secs()
        );

        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle(max_idle).await;
            if evicted > 0 {
                info!("Evicted {} idle wizard sessions", evicted);
            }
        }
    });
}
