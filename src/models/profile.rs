//! Profile and role models for the authorization context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Roles a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Tecnico,
    Escritorio,
    Cliente,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Tecnico => "tecnico",
            Self::Escritorio => "escritorio",
            Self::Cliente => "cliente",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "tecnico" | "técnico" => Some(Self::Tecnico),
            "escritorio" | "escritório" => Some(Self::Escritorio),
            "cliente" => Some(Self::Cliente),
            _ => None,
        }
    }

    /// Can create, edit and delete valves, companies and plants.
    pub fn can_manage_records(&self) -> bool {
        matches!(self, Self::Admin | Self::Escritorio)
    }

    /// Can run inspections (wizard, photo uploads, inspection deletion).
    pub fn can_inspect(&self) -> bool {
        matches!(self, Self::Admin | Self::Escritorio | Self::Tecnico)
    }

    /// Visibility is limited to the profile's own company.
    pub fn is_company_scoped(&self) -> bool {
        matches!(self, Self::Cliente)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Claims carried by the identity provider's session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Profile id
    pub sub: String,
    pub exp: usize,
    pub role: String,
    #[serde(default)]
    pub empresa_id: Option<Uuid>,
}

/// Profile summary used in reports.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub empresa_id: Option<Uuid>,
}
