//! Opening-pressure tolerance rule.
//!
//! A trial is approved when it lies within ±3% of the cold differential test
//! pressure, both ends inclusive. Only the third trial decides the outcome.

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{TestComponent, TestReadings, TestSelection};

pub const LOWER_FACTOR: f64 = 0.97;
pub const UPPER_FACTOR: f64 = 1.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ToleranceBand {
    pub cdtp: f64,
    pub min: f64,
    pub max: f64,
}

impl ToleranceBand {
    pub fn from_cdtp(cdtp: f64) -> Self {
        Self {
            cdtp,
            min: cdtp * LOWER_FACTOR,
            max: cdtp * UPPER_FACTOR,
        }
    }

    pub fn approves(&self, reading: f64) -> bool {
        self.min <= reading && reading <= self.max
    }
}

/// Outcome shown for the test readings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TestEvaluation {
    /// Present when opening pressure is selected and CDTP is known
    pub band: Option<ToleranceBand>,
    /// Third trial reading, if entered
    pub deciding_trial: Option<f64>,
    pub deciding_trial_approved: Option<bool>,
    /// False only when the third trial was entered and falls outside the band
    pub approved: bool,
}

pub fn evaluate(selection: &TestSelection, cdtp: Option<f64>, readings: &TestReadings) -> TestEvaluation {
    if !selection.includes(TestComponent::PressaoAbertura) {
        return TestEvaluation {
            band: None,
            deciding_trial: None,
            deciding_trial_approved: None,
            approved: true,
        };
    }

    let band = cdtp.map(ToleranceBand::from_cdtp);
    let deciding_trial = readings.deciding_trial();
    let deciding_trial_approved = match (band, deciding_trial) {
        (Some(band), Some(reading)) => Some(band.approves(reading)),
        _ => None,
    };

    TestEvaluation {
        band,
        deciding_trial,
        deciding_trial_approved,
        approved: deciding_trial_approved.unwrap_or(true),
    }
}
