//! Test-mode configuration and readings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which test campaign is being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    TesteRecebimento,
    TesteIntermediario,
    TesteFinal,
}

impl TestType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TesteRecebimento => "Teste de Recebimento",
            Self::TesteIntermediario => "Teste Intermediário",
            Self::TesteFinal => "Teste Final",
        }
    }
}

/// Individual tests that can be selected for a tests-mode inspection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum TestComponent {
    PressaoAbertura,
    Estanqueidade,
    Contrapressao,
}

impl TestComponent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PressaoAbertura => "pressao_abertura",
            Self::Estanqueidade => "estanqueidade",
            Self::Contrapressao => "contrapressao",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pressao_abertura" => Some(Self::PressaoAbertura),
            "estanqueidade" => Some(Self::Estanqueidade),
            "contrapressao" => Some(Self::Contrapressao),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PressaoAbertura => "Pressão de Abertura",
            Self::Estanqueidade => "Estanqueidade",
            Self::Contrapressao => "Contrapressão",
        }
    }
}

/// Test type plus the chosen tests. Both must be set before leaving mode selection.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub struct TestSelection {
    pub test_type: Option<TestType>,
    #[serde(default)]
    pub components: BTreeSet<TestComponent>,
}

impl TestSelection {
    pub fn is_complete(&self) -> bool {
        self.test_type.is_some() && !self.components.is_empty()
    }

    pub fn includes(&self, component: TestComponent) -> bool {
        self.components.contains(&component)
    }
}

/// Raw readings entered in the first step of the test sub-flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct TestReadings {
    /// Opening pressure trials 1..=3 (bar-g)
    #[schema(value_type = Vec<Option<f64>>)]
    pub opening_pressure: [Option<f64>; 3],
    pub leak_bubbles_per_minute: Option<f64>,
    /// `None` until the back-pressure outcome is recorded
    pub back_pressure_approved: Option<bool>,
    /// Required whenever the back-pressure test was not approved
    pub failure_justification: Option<String>,
}

impl TestReadings {
    /// Third trial, the one evaluated against tolerance.
    pub fn deciding_trial(&self) -> Option<f64> {
        self.opening_pressure[2]
    }
}
