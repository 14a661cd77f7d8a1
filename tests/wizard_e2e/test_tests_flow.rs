//! Tests-mode inspection: readings, tolerance evaluation and videos.

use std::collections::BTreeSet;

use psv_inspection_lib::models::{TestComponent, TestReadings, TestSelection, TestType};
use psv_inspection_lib::services::wizard::{
    IncomingFile, TestStage, Transition, WizardError, WizardMode,
};

use super::test_helpers::{Harness, inspector};

fn selection(components: &[TestComponent]) -> TestSelection {
    TestSelection {
        test_type: Some(TestType::TesteFinal),
        components: components.iter().copied().collect::<BTreeSet<_>>(),
    }
}

#[tokio::test]
async fn test_third_trial_outside_band_is_not_approved() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-010", Some(16.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(
            WizardMode::Tests,
            selection(&[TestComponent::PressaoAbertura]),
        )
        .unwrap();
    wizard.advance().await.unwrap();

    // CDTP is prefilled from the valve
    assert_eq!(wizard.snapshot().fields.cdtp, Some(16.0));
    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::Moved { from: 1, to: 2 }
    );
    assert_eq!(wizard.test_stage(), Some(TestStage::Readings));

    wizard
        .update_test_readings(TestReadings {
            opening_pressure: [Some(15.8), Some(15.9), Some(16.5)],
            ..Default::default()
        })
        .unwrap();

    let evaluation = wizard.snapshot().tests.unwrap().evaluation;
    let band = evaluation.band.unwrap();
    assert!((band.min - 15.52).abs() < 1e-9);
    assert!((band.max - 16.48).abs() < 1e-9);
    assert_eq!(evaluation.deciding_trial, Some(16.5));
    assert_eq!(evaluation.deciding_trial_approved, Some(false));
    assert!(!evaluation.approved);

    assert_eq!(
        wizard.advance().await.unwrap(),
        Transition::StageChanged {
            from: TestStage::Readings,
            to: TestStage::Videos,
        }
    );

    wizard
        .upload_test_video(
            TestComponent::PressaoAbertura,
            IncomingFile::new("abertura.mp4", vec![7; 128]),
        )
        .await
        .unwrap();
    let videos = wizard.snapshot().tests.unwrap().videos;
    assert_eq!(videos.len(), 1);
    assert!(videos[0].storage_key.contains("/videos/pressao_abertura/"));

    assert_eq!(wizard.advance().await.unwrap(), Transition::Completed);
}

#[tokio::test]
async fn test_missing_trial_blocks_videos_stage() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-011", Some(10.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(
            WizardMode::Tests,
            selection(&[TestComponent::PressaoAbertura, TestComponent::Contrapressao]),
        )
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();

    wizard
        .update_test_readings(TestReadings {
            opening_pressure: [Some(10.0), Some(10.1), None],
            back_pressure_approved: Some(true),
            ..Default::default()
        })
        .unwrap();
    assert!(matches!(
        wizard.advance().await,
        Err(WizardError::Validation(_))
    ));
    assert_eq!(wizard.test_stage(), Some(TestStage::Readings));

    wizard
        .update_test_readings(TestReadings {
            opening_pressure: [Some(10.0), Some(10.1), Some(10.2)],
            back_pressure_approved: Some(false),
            failure_justification: None,
            ..Default::default()
        })
        .unwrap();
    assert!(matches!(
        wizard.advance().await,
        Err(WizardError::Validation(_))
    ));

    wizard
        .update_test_readings(TestReadings {
            opening_pressure: [Some(10.0), Some(10.1), Some(10.2)],
            back_pressure_approved: Some(false),
            failure_justification: Some("Vazamento na sede".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(matches!(
        wizard.advance().await.unwrap(),
        Transition::StageChanged { .. }
    ));
}

#[tokio::test]
async fn test_opening_pressure_needs_cdtp() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-012", None);
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(
            WizardMode::Tests,
            selection(&[TestComponent::PressaoAbertura]),
        )
        .unwrap();
    wizard.advance().await.unwrap();

    assert!(matches!(
        wizard.advance().await,
        Err(WizardError::Validation(_))
    ));
    assert_eq!(harness.store.create_calls(), 0);
}

#[tokio::test]
async fn test_video_only_for_selected_component() {
    let harness = Harness::new();
    let valve = harness.store.add_valve("PSV-013", Some(5.0));
    let (_, wizard) = harness.open(&inspector(), &valve).await;
    let mut wizard = wizard.lock().await;

    wizard
        .set_mode(WizardMode::Tests, selection(&[TestComponent::Estanqueidade]))
        .unwrap();
    wizard.advance().await.unwrap();
    wizard.advance().await.unwrap();

    // Not yet at the videos stage
    assert!(matches!(
        wizard
            .upload_test_video(
                TestComponent::Estanqueidade,
                IncomingFile::new("teste.mp4", vec![1; 8]),
            )
            .await,
        Err(WizardError::WrongStep(_))
    ));

    wizard
        .update_test_readings(TestReadings {
            leak_bubbles_per_minute: Some(0.0),
            ..Default::default()
        })
        .unwrap();
    wizard.advance().await.unwrap();

    assert!(matches!(
        wizard
            .upload_test_video(
                TestComponent::Contrapressao,
                IncomingFile::new("teste.mp4", vec![1; 8]),
            )
            .await,
        Err(WizardError::Validation(_))
    ));

    // A second video for the same component replaces the first
    wizard
        .upload_test_video(
            TestComponent::Estanqueidade,
            IncomingFile::new("primeiro.mp4", vec![1; 8]),
        )
        .await
        .unwrap();
    wizard
        .upload_test_video(
            TestComponent::Estanqueidade,
            IncomingFile::new("segundo.mov", vec![2; 8]),
        )
        .await
        .unwrap();
    let videos = wizard.snapshot().tests.unwrap().videos;
    assert_eq!(videos.len(), 1);
    assert_eq!(videos[0].filename, "segundo.mov");
    assert_eq!(harness.files.keys().len(), 1);
    assert_eq!(harness.files.deleted().len(), 1);
}
