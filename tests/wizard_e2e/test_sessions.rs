//! Session ownership, eviction and upload cancellation.

use std::time::Duration;

use psv_inspection_lib::auth::AuthContext;
use psv_inspection_lib::error::AppError;
use psv_inspection_lib::models::{TestSelection, UserRole};
use psv_inspection_lib::services::wizard::{IncomingFile, NoticeLevel, WizardMode};
use uuid::Uuid;

use super::test_helpers::{Harness, inspector};

#[tokio::test]
async fn test_sessions_belong_to_their_profile() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-050", None);
    let owner = inspector();
    let (session_id, _) = harness.open(&owner, &valve).await;

    assert!(harness.sessions.get(&owner, session_id).await.is_ok());
    let other = inspector();
    assert!(matches!(
        harness.sessions.get(&other, session_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        harness.sessions.close(&other, session_id).await,
        Err(AppError::NotFound(_))
    ));

    harness.sessions.close(&owner, session_id).await.unwrap();
    assert!(harness.sessions.is_empty().await);
}

#[tokio::test]
async fn test_start_checks_role_and_visibility() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-051", None);

    let cliente = AuthContext::new(Uuid::new_v4(), UserRole::Cliente, Some(Uuid::new_v4()));
    assert!(matches!(
        harness.sessions.start(&cliente, valve.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        harness.sessions.start(&inspector(), Uuid::new_v4()).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(harness.sessions.len().await, 0);
}

#[tokio::test]
async fn test_idle_sessions_are_evicted() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-052", None);
    let ctx = inspector();
    let (first, _) = harness.open(&ctx, &valve).await;
    harness.open(&ctx, &valve).await;

    assert_eq!(
        harness.sessions.evict_idle(Duration::from_secs(3600)).await,
        0
    );
    assert_eq!(harness.sessions.evict_idle(Duration::ZERO).await, 2);
    assert!(matches!(
        harness.sessions.get(&ctx, first).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_closing_session_cancels_uploads() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-053", None);
    let ctx = inspector();
    let (session_id, wizard) = harness.open(&ctx, &valve).await;

    let inspection_id = {
        let mut wizard = wizard.lock().await;
        wizard
            .set_mode(WizardMode::Registry, TestSelection::default())
            .unwrap();
        wizard.advance().await.unwrap();
        wizard.advance().await.unwrap();
        wizard.inspection_id().unwrap()
    };

    harness.files.hold_uploads();
    let upload = async {
        let mut wizard = wizard.lock().await;
        let stored = wizard
            .upload_photos(vec![
                IncomingFile::new("frente.jpg", vec![1; 8]),
                IncomingFile::new("placa.jpg", vec![2; 8]),
            ])
            .await;
        (stored, wizard.drain_notices())
    };
    // Close does not need the wizard lock the upload is holding
    let close = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        harness.sessions.close(&ctx, session_id).await
    };

    let ((stored, notices), closed) =
        tokio::time::timeout(Duration::from_secs(2), async { tokio::join!(upload, close) })
            .await
            .expect("upload should stop after close");
    closed.unwrap();
    assert!(stored.unwrap().is_empty());
    assert_eq!(
        notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count(),
        2
    );
    assert!(harness.store.photos_of(inspection_id).is_empty());
    assert!(harness.files.keys().is_empty());
    // Interrupted uploads may have reached storage, so their keys are discarded
    assert_eq!(harness.files.deleted().len(), 2);
}
