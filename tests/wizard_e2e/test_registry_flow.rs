//! Registry-mode inspection from mode selection to finalize.

use psv_inspection_lib::models::{
    ComponentCondition, ComponentName, ComponentRecord, InspectionFields, InspectionKind,
    PhotoStep, RequiredAction, TestSelection,
};
use psv_inspection_lib::services::wizard::{
    IncomingFile, Transition, WizardError, WizardMode, WizardStatus,
};

use super::test_helpers::{Harness, inspector};

#[tokio::test]
async fn test_registry_inspection_end_to_end() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-001", None);
    let ctx = inspector();
    let (_, wizard) = harness.open(&ctx, &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::Moved { from: 0, to: 1 }
    );
    assert_eq!(harness.store.create_calls(), 0);

    wizard
        .update_fields(InspectionFields {
            kind: InspectionKind::Periodica,
            cdtp: None,
            ..Default::default()
        })
        .unwrap();
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::Moved { from: 1, to: 2 }
    );
    let inspection_id = wizard.inspection_id().expect("inspection created");
    let stored = harness.store.inspection(inspection_id).unwrap();
    assert_eq!(stored.new.valve_id, valve.id);
    assert_eq!(stored.new.inspector_id, ctx.profile_id);
    assert!(stored.completed_at.is_none());

    let uploaded = wizard
        .upload_photos(vec![
            IncomingFile::new("frente.jpg", vec![1; 64]),
            IncomingFile::new("placa.png", vec![2; 64]),
        ])
        .await
        .unwrap();
    assert_eq!(uploaded.len(), 2);
    let photos = harness.store.photos_of(inspection_id);
    assert_eq!(photos.len(), 2);
    assert!(photos.iter().all(|p| p.record.step == PhotoStep::Chegada));
    assert_eq!(harness.files.keys().len(), 2);

    // Remaining photo steps need no uploads
    for to in 3..=9 {
        assert_eq!(
            wizard.advance().await.unwrap(),
            Transition::Moved { from: to - 1, to }
        );
    }
    assert_eq!(wizard.snapshot().step.key, "components_and_actions");

    let mut disco = ComponentRecord::new(ComponentName::Disco);
    disco.condition = Some(ComponentCondition::Good);
    wizard.add_component(disco.clone()).unwrap();
    assert!(wizard.toggle_action(RequiredAction::Limpeza).unwrap());

    assert_eq!(wizard.advance().await.unwrap(), Transition::Completed);
    assert_eq!(wizard.status(), WizardStatus::Completed);

    assert_eq!(harness.store.components_of(inspection_id), vec![disco]);
    assert_eq!(
        harness.store.actions_of(inspection_id),
        vec![RequiredAction::Limpeza]
    );
    let stored = harness.store.inspection(inspection_id).unwrap();
    assert!(stored.completed_at.is_some());
    assert_eq!(stored.approved, Some(true));

    assert_eq!(wizard.advance().await, Err(WizardError::Finished));
}

#[tokio::test]
async fn test_component_edits_only_at_final_step() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-002", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    assert!(matches!(
        wizard.add_component(ComponentRecord::new(ComponentName::Mola)),
        Err(WizardError::WrongStep(_))
    ));
    assert!(matches!(
        wizard.toggle_action(RequiredAction::Reparo),
        Err(WizardError::WrongStep(_))
    ));

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    for _ in 0..9 {
        wizard.advance().await.unwrap();
    }

    let index = wizard
        .add_component(ComponentRecord::new(ComponentName::Mola))
        .unwrap();
    let mut sede = ComponentRecord::new(ComponentName::Sede);
    sede.condition = Some(ComponentCondition::Bad);
    wizard.update_component(index, sede.clone()).unwrap();
    assert_eq!(wizard.snapshot().components, vec![sede]);

    assert!(matches!(
        wizard.remove_component(5),
        Err(WizardError::NotFound(_))
    ));
    wizard.remove_component(index).unwrap();
    assert!(wizard.snapshot().components.is_empty());

    // Toggling twice clears the action again
    assert!(wizard.toggle_action(RequiredAction::Reparo).unwrap());
    assert!(!wizard.toggle_action(RequiredAction::Reparo).unwrap());
    assert!(wizard.snapshot().actions.is_empty());
}

#[tokio::test]
async fn test_fields_locked_after_inspection_created() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-003", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();
    wizard.retreat().unwrap();

    assert_eq!(wizard.step_index(), 1);
    assert_eq!(
        wizard.update_fields(InspectionFields::default()),
        Err(WizardError::FieldsLocked)
    );

    // Going forward again does not create a second record
    wizard.advance().await.unwrap();
    assert_eq!(harness.store.create_calls(), 1);
}

#[tokio::test]
async fn test_leak_test_requires_bubbles() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-004", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    wizard
        .update_fields(InspectionFields {
            leak_test: true,
            ..Default::default()
        })
        .unwrap();

    assert!(matches!(
        wizard.advance().await,
        Err(WizardError::Validation(_))
    ));
    assert_eq!(wizard.step_index(), 1);
    assert_eq!(harness.store.create_calls(), 0);
    assert_eq!(wizard.drain_notices().len(), 1);
}
