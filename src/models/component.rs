//! Component inspection records and their fixed vocabularies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Physical valve components that can be examined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ComponentName {
    Corpo,
    Aro,
    Castelo,
    Bocal,
    Fole,
    Disco,
    Sede,
    Parafusos,
    Mola,
    Guia,
    PorcaDeRegulagem,
    Outro,
}

impl ComponentName {
    pub const ALL: [ComponentName; 12] = [
        Self::Corpo,
        Self::Aro,
        Self::Castelo,
        Self::Bocal,
        Self::Fole,
        Self::Disco,
        Self::Sede,
        Self::Parafusos,
        Self::Mola,
        Self::Guia,
        Self::PorcaDeRegulagem,
        Self::Outro,
    ];

    /// Name stored in `inspecao_componentes.componente`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Corpo => "Corpo",
            Self::Aro => "Aro",
            Self::Castelo => "Castelo",
            Self::Bocal => "Bocal",
            Self::Fole => "Fole",
            Self::Disco => "Disco",
            Self::Sede => "Sede",
            Self::Parafusos => "Parafusos",
            Self::Mola => "Mola",
            Self::Guia => "Guia",
            Self::PorcaDeRegulagem => "Porca de regulagem",
            Self::Outro => "Outro",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

/// Observed condition of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ComponentCondition {
    #[serde(rename = "bom")]
    Good,
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "ruim")]
    Bad,
    #[serde(rename = "na")]
    NotApplicable,
}

impl ComponentCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "bom",
            Self::Regular => "regular",
            Self::Bad => "ruim",
            Self::NotApplicable => "na",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bom" => Some(Self::Good),
            "regular" => Some(Self::Regular),
            "ruim" => Some(Self::Bad),
            "na" => Some(Self::NotApplicable),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "Bom",
            Self::Regular => "Regular",
            Self::Bad => "Ruim",
            Self::NotApplicable => "N/A",
        }
    }
}

/// One examined component, buffered by the wizard until finalize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComponentRecord {
    pub component: ComponentName,
    #[serde(default)]
    pub condition: Option<ComponentCondition>,
    /// Free-text condition code, e.g. "A-corrido"
    #[serde(default)]
    pub condition_code: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub replacement_material_code: Option<String>,
    #[serde(default)]
    pub replacement_heat_number: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
}

impl ComponentRecord {
    pub fn new(component: ComponentName) -> Self {
        Self {
            component,
            condition: None,
            condition_code: String::new(),
            note: String::new(),
            replacement_material_code: None,
            replacement_heat_number: None,
            age: None,
        }
    }
}

/// Persisted component row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InspectionComponent {
    pub id: Uuid,
    pub inspection_id: Option<Uuid>,
    pub component: String,
    pub condition: Option<String>,
    pub condition_code: Option<String>,
    pub note: Option<String>,
    pub replacement_material_code: Option<String>,
    pub replacement_heat_number: Option<String>,
    pub age: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl InspectionComponent {
    pub fn from_entity(m: crate::entity::inspection_component::Model) -> Self {
        Self {
            id: m.id,
            inspection_id: m.inspecao_id,
            component: m.componente,
            condition: m.condicao,
            condition_code: m.codigo_condicao,
            note: m.observacao,
            replacement_material_code: m.novo_codigo_material,
            replacement_heat_number: m.nova_corrida,
            age: m.age,
            created_at: Some(m.created_at),
        }
    }
}
