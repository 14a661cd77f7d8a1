//! Step sequencing, the mode gate and the mode lock.

use std::collections::BTreeSet;

use psv_inspection_lib::models::{TestComponent, TestSelection, TestType};
use psv_inspection_lib::services::wizard::{Transition, WizardError, WizardMode};

use super::test_helpers::{Harness, inspector};

fn pressure_only() -> TestSelection {
    TestSelection {
        test_type: Some(TestType::TesteRecebimento),
        components: BTreeSet::from([TestComponent::PressaoAbertura]),
    }
}

#[tokio::test]
async fn test_mode_gate_blocks_step_zero() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-030", Some(12.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    assert!(!wizard.can_advance());
    assert_eq!(wizard.advance().await.unwrap(), Transition::Blocked);
    assert_eq!(wizard.step_index(), 0);

    // Tests mode without components is still incomplete
    wizard
        .set_mode(
            WizardMode::Tests,
            TestSelection {
                test_type: Some(TestType::TesteFinal),
                components: BTreeSet::new(),
            },
        )
        .unwrap();
    assert_eq!(wizard.advance().await.unwrap(), Transition::Blocked);

    wizard.set_mode(WizardMode::Tests, pressure_only()).unwrap();
    assert!(wizard.can_advance());
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::Moved { from: 0, to: 1 }
    );
    assert_eq!(harness.store.create_calls(), 0);
}

#[tokio::test]
async fn test_selection_locked_after_leaving_step_zero() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-031", Some(12.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard.set_mode(WizardMode::Tests, pressure_only()).unwrap();
    wizard.advance().await.unwrap();
    assert!(wizard.snapshot().selection_locked);

    wizard.retreat().unwrap();
    assert_eq!(wizard.step_index(), 0);

    let mut wider = pressure_only();
    wider.components.insert(TestComponent::Estanqueidade);
    assert_eq!(
        wizard.set_mode(WizardMode::Tests, wider),
        Err(WizardError::SelectionLocked)
    );
    assert_eq!(
        wizard.set_mode(WizardMode::Registry, TestSelection::default()),
        Err(WizardError::SelectionLocked)
    );
    // Same choice again is accepted
    wizard.set_mode(WizardMode::Tests, pressure_only()).unwrap();
    assert_eq!(
        wizard.snapshot().test_selection.components,
        BTreeSet::from([TestComponent::PressaoAbertura])
    );
}

#[tokio::test]
async fn test_step_index_is_monotonic() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-032", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();

    // Forward and back in an irregular pattern
    let pattern = [true, true, false, true, true, true, false, false, true, true];
    for forward in pattern {
        let before = wizard.step_index();
        if forward {
            wizard.advance().await.unwrap();
            assert!(wizard.step_index() >= before);
        } else {
            wizard.retreat().unwrap();
            assert!(wizard.step_index() <= before);
        }
    }

    while wizard.step_index() > 0 {
        wizard.retreat().unwrap();
    }
    assert_eq!(wizard.retreat().unwrap(), Transition::Exit);
    assert_eq!(wizard.step_index(), 0);

    // Retreat never undoes persisted data
    assert_eq!(harness.store.inspection_count(), 1);
    assert!(wizard.inspection_id().is_some());
}

#[tokio::test]
async fn test_step_descriptor_follows_mode() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-033", Some(3.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    let snapshot = wizard.snapshot();
    assert_eq!(snapshot.step.key, "mode_selection");
    assert_eq!(snapshot.step_count, 10);

    wizard.set_mode(WizardMode::Tests, pressure_only()).unwrap();
    assert_eq!(wizard.snapshot().step_count, 3);

    wizard
        .set_mode(WizardMode::Registry, TestSelection::default())
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();
    let snapshot = wizard.snapshot();
    assert_eq!(snapshot.step.key, "chegada");
    assert!(!snapshot.step.guidelines.is_empty());
}
