//! Inspection records and the inspection form fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Kind of inspection episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum InspectionKind {
    Recebimento,
    #[default]
    Periodica,
    Extraordinaria,
    VisualExterna,
}

impl InspectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recebimento => "recebimento",
            Self::Periodica => "periodica",
            Self::Extraordinaria => "extraordinaria",
            Self::VisualExterna => "visual_externa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recebimento" => Some(Self::Recebimento),
            "periodica" => Some(Self::Periodica),
            "extraordinaria" => Some(Self::Extraordinaria),
            "visual_externa" => Some(Self::VisualExterna),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Recebimento => "Recebimento",
            Self::Periodica => "Periódica",
            Self::Extraordinaria => "Extraordinária",
            Self::VisualExterna => "Visual Externa",
        }
    }
}

/// Fluid used on the test bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestFluid {
    #[default]
    Liquido,
    Gasoso,
}

impl TestFluid {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liquido => "liquido",
            Self::Gasoso => "gasoso",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "liquido" => Some(Self::Liquido),
            "gasoso" => Some(Self::Gasoso),
            _ => None,
        }
    }
}

/// Editable inspection form, held by the wizard until the inspection is created.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct InspectionFields {
    pub kind: InspectionKind,
    pub instruments_used: String,
    pub observations: String,
    /// Cold differential test pressure (bar-g); blank is allowed in registry mode
    pub cdtp: Option<f64>,
    pub test_fluid: TestFluid,
    pub seal_code: String,
    pub joint_integrity_test: bool,
    pub leak_test: bool,
    /// Bubbles per minute; required while `leak_test` is checked
    pub leak_bubbles_per_minute: Option<f64>,
    pub vr_seal: bool,
}

/// Payload for creating an inspection record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInspection {
    pub valve_id: Uuid,
    pub inspector_id: Uuid,
    pub fields: InspectionFields,
    pub started_at: DateTime<Utc>,
}

/// Persisted inspection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Inspection {
    pub id: Uuid,
    pub valve_id: Option<Uuid>,
    pub inspector_id: Option<Uuid>,
    pub service_order_id: Option<Uuid>,
    pub kind: InspectionKind,
    pub instruments_used: Option<String>,
    pub observations: Option<String>,
    pub cdtp: Option<f64>,
    pub test_fluid: Option<TestFluid>,
    pub seal_code: Option<String>,
    pub joint_integrity_test: bool,
    pub leak_test: bool,
    pub leak_bubbles_per_minute: Option<f64>,
    pub vr_seal: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub approved: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Inspection {
    /// Convert from SeaORM entity model to API response DTO.
    pub fn from_entity(m: crate::entity::inspection::Model) -> Self {
        Self {
            id: m.id,
            valve_id: m.valvula_id,
            inspector_id: m.tecnico_id,
            service_order_id: m.ordem_servico_id,
            kind: InspectionKind::parse(&m.tipo_inspecao).unwrap_or_default(),
            instruments_used: m.instrumentos_utilizados,
            observations: m.observacoes,
            cdtp: m.pressao_abertura_frio_cdtp,
            test_fluid: m.fluido_teste.as_deref().and_then(TestFluid::parse),
            seal_code: m.codigo_lacre,
            joint_integrity_test: m.teste_integridade_juntas,
            leak_test: m.teste_estanqueidade,
            leak_bubbles_per_minute: m.estanqueidade_bpm,
            vr_seal: m.selo_vr,
            started_at: m.data_inicio,
            completed_at: m.data_conclusao,
            approved: m.resultado_aprovado,
            created_at: m.created_at,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InspectionListResponse {
    pub inspections: Vec<Inspection>,
    pub total: usize,
}
