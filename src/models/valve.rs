//! Valve records and request payloads.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Manufacturer assumed when none is given on creation.
pub const DEFAULT_MANUFACTURER: &str = "LESER";

/// Default inspection periodicity in months.
pub const DEFAULT_PERIODICITY_MONTHS: i32 = 12;

/// Operational status of a valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValveStatus {
    #[default]
    Ativa,
    Inativa,
    Manutencao,
}

impl ValveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ativa => "ativa",
            Self::Inativa => "inativa",
            Self::Manutencao => "manutencao",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ativa" => Some(Self::Ativa),
            "inativa" => Some(Self::Inativa),
            "manutencao" => Some(Self::Manutencao),
            _ => None,
        }
    }
}

/// A pressure safety valve.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Valve {
    pub id: Uuid,
    pub tag: String,
    pub empresa_id: Option<Uuid>,
    pub planta_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub valve_type: Option<String>,
    pub diameter: Option<String>,
    pub fluid: Option<String>,
    pub body_material: Option<String>,
    pub internals_material: Option<String>,
    /// Cold differential test pressure (bar-g)
    pub cdtp: Option<f64>,
    pub set_pressure: Option<f64>,
    pub back_pressure: Option<f64>,
    pub operating_temperature: Option<f64>,
    pub status: ValveStatus,
    pub periodicity_months: i32,
    pub next_inspection: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Valve {
    /// Convert from SeaORM entity model to API response DTO.
    pub fn from_entity(m: crate::entity::valve::Model) -> Self {
        Self {
            id: m.id,
            tag: m.tag,
            empresa_id: m.empresa_id,
            planta_id: m.planta_id,
            manufacturer: m.fabricante,
            model: m.modelo,
            serial_number: m.numero_serie,
            location: m.localizacao,
            valve_type: m.tipo_valvula,
            diameter: m.diametro,
            fluid: m.fluido,
            body_material: m.material_corpo,
            internals_material: m.material_internos,
            cdtp: m.cdtp,
            set_pressure: m.pressao_abertura,
            back_pressure: m.contra_pressao,
            operating_temperature: m.temperatura_operacao,
            status: ValveStatus::parse(&m.status).unwrap_or_default(),
            periodicity_months: m.periodicidade_meses,
            next_inspection: m.proxima_inspecao,
            notes: m.observacoes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    pub fn to_ref(&self) -> ValveRef {
        ValveRef {
            id: self.id,
            tag: self.tag.clone(),
            empresa_id: self.empresa_id,
            cdtp: self.cdtp,
        }
    }
}

/// Minimal valve reference handed to the inspection wizard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValveRef {
    pub id: Uuid,
    pub tag: String,
    pub empresa_id: Option<Uuid>,
    pub cdtp: Option<f64>,
}

/// Create or update payload. On update, absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ValveRequest {
    pub tag: Option<String>,
    pub empresa_id: Option<Uuid>,
    pub planta_id: Option<Uuid>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub valve_type: Option<String>,
    pub diameter: Option<String>,
    pub fluid: Option<String>,
    pub body_material: Option<String>,
    pub internals_material: Option<String>,
    pub cdtp: Option<f64>,
    pub set_pressure: Option<f64>,
    pub back_pressure: Option<f64>,
    pub operating_temperature: Option<f64>,
    pub status: Option<ValveStatus>,
    pub periodicity_months: Option<i32>,
    pub next_inspection: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl ValveRequest {
    /// Treat blank strings as absent, matching how the forms submit untouched inputs.
    pub fn normalized(mut self) -> Self {
        fn clean(value: &mut Option<String>) {
            if let Some(v) = value {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    *value = None;
                } else if trimmed.len() != v.len() {
                    *value = Some(trimmed.to_string());
                }
            }
        }

        clean(&mut self.tag);
        clean(&mut self.manufacturer);
        clean(&mut self.model);
        clean(&mut self.serial_number);
        clean(&mut self.location);
        clean(&mut self.valve_type);
        clean(&mut self.diameter);
        clean(&mut self.fluid);
        clean(&mut self.body_material);
        clean(&mut self.internals_material);
        clean(&mut self.notes);
        self
    }

    /// TAG is the only required field of a new valve.
    pub fn require_tag(&self) -> Result<&str, String> {
        self.tag
            .as_deref()
            .ok_or_else(|| "TAG is required".to_string())
    }
}

/// Query parameters for listing valves.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListValvesQuery {
    /// Case-insensitive match on TAG, manufacturer, model or serial number
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValveListResponse {
    pub valves: Vec<Valve>,
    pub total: usize,
}
