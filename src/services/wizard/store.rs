//! Collaborators the wizard persists through.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::AppResult;
use crate::models::{ComponentRecord, NewInspection, NewPhotoRecord, RequiredAction, ValveRef};

/// Relational persistence used by the wizard.
///
/// Every call receives the caller's [`AuthContext`]; implementations decide
/// what the caller may touch.
#[async_trait]
pub trait InspectionStore: Send + Sync {
    async fn find_valve(&self, ctx: &AuthContext, valve_id: Uuid) -> AppResult<Option<ValveRef>>;

    async fn create_inspection(&self, ctx: &AuthContext, new: &NewInspection) -> AppResult<Uuid>;

    /// Insert all records in one batch. No per-item granularity.
    async fn bulk_insert_components(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        components: &[ComponentRecord],
    ) -> AppResult<()>;

    async fn bulk_insert_actions(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        actions: &[RequiredAction],
    ) -> AppResult<()>;

    async fn update_inspection_completion(
        &self,
        ctx: &AuthContext,
        inspection_id: Uuid,
        completed_at: DateTime<Utc>,
        approved: bool,
    ) -> AppResult<()>;

    /// Dependent component, action and photo rows go with it.
    async fn delete_inspection(&self, ctx: &AuthContext, inspection_id: Uuid) -> AppResult<()>;

    async fn insert_photo_record(
        &self,
        ctx: &AuthContext,
        record: &NewPhotoRecord,
    ) -> AppResult<Uuid>;

    async fn update_photo_caption(
        &self,
        ctx: &AuthContext,
        photo_id: Uuid,
        caption: &str,
    ) -> AppResult<()>;

    async fn delete_photo_record(&self, ctx: &AuthContext, photo_id: Uuid) -> AppResult<()>;
}

/// Object storage used for photos and test videos.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `data` under `path_hint` and return its public URL.
    async fn upload_file(
        &self,
        ctx: &AuthContext,
        path_hint: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> AppResult<String>;

    async fn delete_file(&self, ctx: &AuthContext, path_hint: &str) -> AppResult<()>;
}
