//! Step sequences of the two inspection modes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::PhotoStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WizardMode {
    /// Photographic documentation of each physical stage
    Registry,
    /// Opening pressure, leak-tightness and back-pressure testing
    Tests,
}

/// Stages of the nested test sub-flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestStage {
    #[default]
    Readings,
    Videos,
}

impl TestStage {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Readings => "Resultados dos Testes",
            Self::Videos => "Vídeos de Confirmação",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    ModeSelection,
    InspectionInfo,
    Photo(PhotoStep),
    ComponentsAndActions,
    TestSubFlow,
}

pub const REGISTRY_STEPS: [WizardStep; 10] = [
    WizardStep::ModeSelection,
    WizardStep::InspectionInfo,
    WizardStep::Photo(PhotoStep::Chegada),
    WizardStep::Photo(PhotoStep::Desmontada),
    WizardStep::Photo(PhotoStep::Disco),
    WizardStep::Photo(PhotoStep::Bocal),
    WizardStep::Photo(PhotoStep::Castelo),
    WizardStep::Photo(PhotoStep::Finalizada),
    WizardStep::Photo(PhotoStep::Lacre),
    WizardStep::ComponentsAndActions,
];

pub const TESTS_STEPS: [WizardStep; 3] = [
    WizardStep::ModeSelection,
    WizardStep::InspectionInfo,
    WizardStep::TestSubFlow,
];

/// Steps shown for a mode. Until a mode is chosen only step 0 is reachable,
/// so the registry list stands in.
pub fn steps_for(mode: Option<WizardMode>) -> &'static [WizardStep] {
    match mode {
        Some(WizardMode::Tests) => &TESTS_STEPS,
        Some(WizardMode::Registry) | None => &REGISTRY_STEPS,
    }
}

impl WizardStep {
    pub fn key(&self) -> &'static str {
        match self {
            Self::ModeSelection => "mode_selection",
            Self::InspectionInfo => "inspection_info",
            Self::Photo(step) => step.as_str(),
            Self::ComponentsAndActions => "components_and_actions",
            Self::TestSubFlow => "tests",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ModeSelection => "Tipo de Inspeção",
            Self::InspectionInfo => "Informações da Inspeção",
            Self::Photo(step) => step.title(),
            Self::ComponentsAndActions => "Componentes e Ações Requeridas",
            Self::TestSubFlow => "Testes",
        }
    }

    pub fn photo_step(&self) -> Option<PhotoStep> {
        match self {
            Self::Photo(step) => Some(*step),
            _ => None,
        }
    }
}

/// Serializable description of the current step.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StepDescriptor {
    pub key: String,
    pub title: String,
    /// Advisory capture checklist for photo steps
    pub guidelines: Vec<String>,
}

impl From<WizardStep> for StepDescriptor {
    fn from(step: WizardStep) -> Self {
        Self {
            key: step.key().to_string(),
            title: step.title().to_string(),
            guidelines: step
                .photo_step()
                .map(|p| p.guidelines().iter().map(|g| g.to_string()).collect())
                .unwrap_or_default(),
        }
    }
}
