//! Retry after failed writes and best-effort finalize.

use psv_inspection_lib::models::{ComponentName, ComponentRecord, RequiredAction, TestSelection};
use psv_inspection_lib::services::wizard::{
    FinalizePart, IncomingFile, InspectionWizard, NoticeLevel, Transition, WizardError,
    WizardMode, WizardStatus,
};

use super::test_helpers::{Harness, Op, inspector};

/// Drive a registry wizard to the final step with one component and one action.
async fn to_final_step(wizard: &mut InspectionWizard) {
    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    for _ in 0..9 {
        wizard.advance().await.unwrap();
    }
    wizard
        .add_component(ComponentRecord::new(ComponentName::Disco))
        .unwrap();
    wizard.toggle_action(RequiredAction::Limpeza).unwrap();
}

#[tokio::test]
async fn test_create_failure_keeps_step_and_retry_succeeds() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-020", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();

    harness.store.fail(Op::CreateInspection);
    assert!(matches!(
        wizard.advance().await,
        Err(WizardError::RemoteWrite(_))
    ));
    assert_eq!(wizard.step_index(), 1);
    assert!(wizard.inspection_id().is_none());
    let notices = wizard.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    harness.store.recover(Op::CreateInspection);
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::Moved { from: 1, to: 2 }
    );
    assert_eq!(harness.store.create_calls(), 2);
    assert_eq!(harness.store.inspection_count(), 1);
    assert!(wizard.inspection_id().is_some());
}

#[tokio::test]
async fn test_finalize_keeps_successful_parts() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-021", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    to_final_step(&mut wizard).await;
    let inspection_id = wizard.inspection_id().unwrap();
    wizard.drain_notices();

    harness.store.fail(Op::BulkComponents);
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::FinalizeIncomplete {
            failed: vec![FinalizePart::Components]
        }
    );
    assert_eq!(wizard.status(), WizardStatus::Active);
    assert!(harness.store.components_of(inspection_id).is_empty());
    assert_eq!(harness.store.actions_of(inspection_id).len(), 1);
    let stored = harness.store.inspection(inspection_id).unwrap();
    assert!(stored.completed_at.is_some());
    assert_eq!(stored.approved, Some(true));

    let progress = wizard.snapshot().finalize;
    assert!(!progress.components_saved);
    assert!(progress.actions_saved);
    assert!(progress.completion_saved);
    assert!(
        wizard
            .drain_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error)
    );

    // Saved actions can no longer be edited; pending components can
    assert_eq!(
        wizard.toggle_action(RequiredAction::Reparo),
        Err(WizardError::AlreadySaved("Required actions"))
    );
    wizard
        .add_component(ComponentRecord::new(ComponentName::Mola))
        .unwrap();

    harness.store.recover(Op::BulkComponents);
    assert_eq!(wizard.advance().await.unwrap(), Transition::Completed);
    assert_eq!(harness.store.components_of(inspection_id).len(), 2);
    // The retry did not insert the actions twice
    assert_eq!(harness.store.actions_of(inspection_id).len(), 1);
}

#[tokio::test]
async fn test_finalize_reports_every_failed_part() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-022", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;
    to_final_step(&mut wizard).await;
    let inspection_id = wizard.inspection_id().unwrap();
    wizard.drain_notices();

    harness.store.fail(Op::BulkActions);
    harness.store.fail(Op::Completion);
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::FinalizeIncomplete {
            failed: vec![FinalizePart::Actions, FinalizePart::Completion]
        }
    );
    assert_eq!(harness.store.components_of(inspection_id).len(), 1);
    assert!(harness.store.actions_of(inspection_id).is_empty());
    assert!(
        harness
            .store
            .inspection(inspection_id)
            .unwrap()
            .completed_at
            .is_none()
    );
    let errors = wizard
        .drain_notices()
        .into_iter()
        .filter(|n| n.level == NoticeLevel::Error)
        .count();
    assert_eq!(errors, 2);
    assert_eq!(wizard.step_index(), 9);
}

#[tokio::test]
async fn test_finalize_with_nothing_buffered_only_marks_completion() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-023", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    for _ in 0..9 {
        wizard.advance().await.unwrap();
    }
    // Empty batches are never sent, so a failing bulk insert is not reached
    harness.store.fail(Op::BulkComponents);
    harness.store.fail(Op::BulkActions);

    assert_eq!(wizard.advance().await.unwrap(), Transition::Completed);
    let stored = harness
        .store
        .inspection(wizard.inspection_id().unwrap())
        .unwrap();
    assert_eq!(stored.approved, Some(true));
}

#[tokio::test]
async fn test_delete_inspection_discards_everything() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-024", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    assert_eq!(
        wizard.delete_inspection().await,
        Err(WizardError::NoInspection)
    );

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();
    wizard
        .upload_photos(vec![IncomingFile::new("frente.jpg", vec![1; 16])])
        .await
        .unwrap();
    let keys = harness.files.keys();
    assert_eq!(keys.len(), 1);

    harness.store.fail(Op::DeleteInspection);
    assert!(matches!(
        wizard.delete_inspection().await,
        Err(WizardError::RemoteWrite(_))
    ));
    assert_eq!(wizard.status(), WizardStatus::Active);

    harness.store.recover(Op::DeleteInspection);
    assert_eq!(wizard.delete_inspection().await.unwrap(), Transition::Deleted);
    assert_eq!(wizard.status(), WizardStatus::Deleted);
    assert_eq!(harness.store.inspection_count(), 0);
    assert!(harness.files.keys().is_empty());
    assert_eq!(harness.files.deleted(), keys);
    assert!(wizard.photos().is_empty());

    assert_eq!(wizard.retreat(), Err(WizardError::Finished));
}
