//! State of the nested test sub-flow: readings, then confirmation videos.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::steps::TestStage;
use super::tolerance::{self, TestEvaluation};
use crate::models::{TestComponent, TestReadings, TestSelection};

/// Confirmation video uploaded for one test component.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TestVideo {
    pub component: TestComponent,
    pub filename: String,
    pub storage_key: String,
    pub url: String,
}

/// Readings and videos are held here only. Nothing in the schema stores them.
#[derive(Debug, Clone, Default)]
pub(super) struct TestSubFlow {
    pub stage: TestStage,
    pub readings: TestReadings,
    pub videos: BTreeMap<TestComponent, TestVideo>,
}

impl TestSubFlow {
    /// Fields required before moving on to the videos stage.
    pub fn validate_readings(&self, selection: &TestSelection) -> Result<(), String> {
        let readings = &self.readings;

        if selection.includes(TestComponent::PressaoAbertura)
            && let Some(missing) = readings.opening_pressure.iter().position(Option::is_none)
        {
            return Err(format!("Opening pressure trial {} is required", missing + 1));
        }

        if selection.includes(TestComponent::Estanqueidade) && readings.leak_bubbles_per_minute.is_none()
        {
            return Err("Leak test bubbles per minute is required".to_string());
        }

        if selection.includes(TestComponent::Contrapressao) {
            match readings.back_pressure_approved {
                None => return Err("Back-pressure result is required".to_string()),
                Some(false) => {
                    let justified = readings
                        .failure_justification
                        .as_deref()
                        .is_some_and(|j| !j.trim().is_empty());
                    if !justified {
                        return Err(
                            "A justification is required when the back-pressure test is not approved"
                                .to_string(),
                        );
                    }
                }
                Some(true) => {}
            }
        }

        Ok(())
    }

    pub fn snapshot(&self, selection: &TestSelection, cdtp: Option<f64>) -> TestSnapshot {
        TestSnapshot {
            stage: self.stage,
            stage_title: self.stage.title().to_string(),
            readings: self.readings.clone(),
            videos: self.videos.values().cloned().collect(),
            evaluation: tolerance::evaluate(selection, cdtp, &self.readings),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TestSnapshot {
    pub stage: TestStage,
    pub stage_title: String,
    pub readings: TestReadings,
    pub videos: Vec<TestVideo>,
    pub evaluation: TestEvaluation,
}
