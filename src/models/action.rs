//! Required actions checklist vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Actions that can be required as the outcome of an inspection.
///
/// Ordering follows the checklist order, so a `BTreeSet` of actions
/// persists in the same order the checklist shows them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    Limpeza,
    Lapidacao,
    JatoPintura,
    Manter,
    Retirada,
    DesmontagemInspecao,
    LimpezaLapidacao,
    Reparo,
    Calibracao,
    Montagem,
}

impl RequiredAction {
    pub const ALL: [RequiredAction; 10] = [
        Self::Limpeza,
        Self::Lapidacao,
        Self::JatoPintura,
        Self::Manter,
        Self::Retirada,
        Self::DesmontagemInspecao,
        Self::LimpezaLapidacao,
        Self::Reparo,
        Self::Calibracao,
        Self::Montagem,
    ];

    /// Value stored in `acoes_requeridas.acao`.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Limpeza => "Limpeza",
            Self::Lapidacao => "Lapidação",
            Self::JatoPintura => "Jato/Pintura",
            Self::Manter => "Manter",
            Self::Retirada => "Retirada",
            Self::DesmontagemInspecao => "Desmontagem/Inspeção",
            Self::LimpezaLapidacao => "Limpeza/Lapidação",
            Self::Reparo => "Reparo",
            Self::Calibracao => "Calibração",
            Self::Montagem => "Montagem",
        }
    }

    /// Path-safe identifier, same as the serialized form.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Limpeza => "limpeza",
            Self::Lapidacao => "lapidacao",
            Self::JatoPintura => "jato_pintura",
            Self::Manter => "manter",
            Self::Retirada => "retirada",
            Self::DesmontagemInspecao => "desmontagem_inspecao",
            Self::LimpezaLapidacao => "limpeza_lapidacao",
            Self::Reparo => "reparo",
            Self::Calibracao => "calibracao",
            Self::Montagem => "montagem",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.slug() == slug)
    }
}

/// Persisted required action row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequiredActionRow {
    pub id: Uuid,
    pub inspection_id: Option<Uuid>,
    pub action: String,
    pub executed: bool,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl RequiredActionRow {
    pub fn from_entity(m: crate::entity::required_action::Model) -> Self {
        Self {
            id: m.id,
            inspection_id: m.inspecao_id,
            action: m.acao,
            executed: m.executada,
            note: m.observacao,
            created_at: Some(m.created_at),
        }
    }
}
