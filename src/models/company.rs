//! Company (empresa) and plant (planta) records.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Plant {
    pub id: Uuid,
    pub name: String,
    pub empresa_id: Option<Uuid>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl Company {
    pub fn from_entity(m: crate::entity::company::Model) -> Self {
        Self {
            id: m.id,
            name: m.nome,
            cnpj: m.cnpj,
            email: m.email,
            phone: m.telefone,
            address: m.endereco,
        }
    }
}

impl Plant {
    pub fn from_entity(m: crate::entity::plant::Model) -> Self {
        Self {
            id: m.id,
            name: m.nome,
            empresa_id: m.empresa_id,
            address: m.endereco,
            contact_name: m.responsavel_nome,
            contact_email: m.responsavel_email,
            contact_phone: m.responsavel_telefone,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePlantRequest {
    pub name: String,
    pub empresa_id: Option<Uuid>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ListPlantsQuery {
    pub empresa_id: Option<Uuid>,
}
