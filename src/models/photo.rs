//! Photo stages of the registry inspection and attachment records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Physical stages photographed during a registry inspection, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PhotoStep {
    Chegada,
    Desmontada,
    Disco,
    Bocal,
    Castelo,
    Finalizada,
    Lacre,
}

impl PhotoStep {
    pub const ALL: [PhotoStep; 7] = [
        Self::Chegada,
        Self::Desmontada,
        Self::Disco,
        Self::Bocal,
        Self::Castelo,
        Self::Finalizada,
        Self::Lacre,
    ];

    /// Identifier stored in `inspecao_fotos.etapa`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chegada => "chegada",
            Self::Desmontada => "desmontada",
            Self::Disco => "disco",
            Self::Bocal => "bocal",
            Self::Castelo => "castelo",
            Self::Finalizada => "finalizada",
            Self::Lacre => "lacre",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == s)
    }

    /// Position in wizard order, used to sort report sections.
    pub fn ordinal(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or(Self::ALL.len())
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Chegada => "Fotos da Válvula na Chegada",
            Self::Desmontada => "Fotos da Válvula Desmontada",
            Self::Disco => "Fotos do Disco",
            Self::Bocal => "Fotos do Bocal",
            Self::Castelo => "Fotos do Castelo",
            Self::Finalizada => "Fotos da Válvula Finalizada",
            Self::Lacre => "Fotos do Lacre",
        }
    }

    /// Advisory checklist shown while capturing this stage. Not validated.
    pub fn guidelines(&self) -> &'static [&'static str] {
        match self {
            Self::Chegada => &[
                "Foto geral da válvula completa",
                "Placa de identificação/nameplate",
                "Estado geral da válvula",
                "Eventuais danos visíveis",
            ],
            Self::Desmontada => &[
                "Corpo da válvula desmontado",
                "Vista dos componentes internos",
                "Estado das roscas",
                "Componentes separados organizados",
            ],
            Self::Disco => &[
                "Vista frontal do disco",
                "Vista lateral do disco",
                "Sede do disco",
                "O-rings e vedações internas",
                "Eventuais desgastes ou danos",
            ],
            Self::Bocal => &[
                "Vista interna do bocal",
                "Sede do bocal",
                "Roscas do bocal",
                "Estado da superfície",
            ],
            Self::Castelo => &[
                "Vista do castelo",
                "Vista do capuz e alavanca (se aplicável)",
                "Vista das roscas",
                "Vista dos flanges",
                "Pontos de oxidação externos (se aplicável)",
            ],
            Self::Finalizada => &[
                "Válvula montada completa",
                "Plaqueta de identificação",
                "Lacre aplicado",
            ],
            Self::Lacre => &[
                "Lacre aplicado na válvula",
                "Código do lacre visível",
                "Posição do lacre",
                "Estado do lacre aplicado",
            ],
        }
    }
}

/// Photo record to insert after the file reached object storage.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPhotoRecord {
    pub inspection_id: Uuid,
    pub step: PhotoStep,
    /// Position within the step, assigned by the uploader
    pub order: i32,
    pub filename: String,
    pub url: String,
    pub caption: String,
}

/// Uploaded photo attachment.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Photo {
    pub id: Uuid,
    pub inspection_id: Option<Uuid>,
    /// Stage identifier (`chegada`, `disco`, ...)
    pub step: String,
    pub filename: String,
    pub url: String,
    pub caption: Option<String>,
    /// Position within its step (`ordem`)
    pub order: Option<i32>,
    /// Object key in storage, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Photo {
    pub fn from_entity(m: crate::entity::inspection_photo::Model) -> Self {
        Self {
            id: m.id,
            inspection_id: m.inspecao_id,
            step: m.etapa,
            filename: m.nome_arquivo,
            url: m.url_foto,
            caption: m.descricao,
            order: m.ordem,
            storage_key: None,
            created_at: Some(m.created_at),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateCaptionRequest {
    pub caption: String,
}
