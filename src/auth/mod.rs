//! Session token verification and the explicit authorization context.
//!
//! Authentication itself happens at the identity provider. This module only
//! verifies the HS256 bearer token it issued and turns the claims into an
//! [`AuthContext`] that every persistence call receives explicitly.

mod extractor;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{SessionClaims, UserRole};

pub use extractor::{AuthError, SessionAuth};

/// Verified caller identity passed to every store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub profile_id: Uuid,
    pub role: UserRole,
    /// Company of the profile; scopes visibility for `cliente`
    pub empresa_id: Option<Uuid>,
}

impl AuthContext {
    pub fn new(profile_id: Uuid, role: UserRole, empresa_id: Option<Uuid>) -> Self {
        Self {
            profile_id,
            role,
            empresa_id,
        }
    }

    pub fn require_record_manager(&self) -> AppResult<()> {
        if self.role.can_manage_records() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' cannot modify records",
                self.role
            )))
        }
    }

    pub fn require_inspector(&self) -> AppResult<()> {
        if self.role.can_inspect() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' cannot run inspections",
                self.role
            )))
        }
    }

    /// Whether a row owned by `empresa_id` is visible to this caller.
    pub fn can_see_company(&self, empresa_id: Option<Uuid>) -> bool {
        if !self.role.is_company_scoped() {
            return true;
        }
        match (self.empresa_id, empresa_id) {
            (Some(own), Some(row)) => own == row,
            _ => false,
        }
    }

    /// Company filter to apply to list queries, if any.
    pub fn company_filter(&self) -> Option<Option<Uuid>> {
        self.role.is_company_scoped().then_some(self.empresa_id)
    }
}

/// HS256 verifier for identity provider session tokens.
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &SecretString) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify signature and expiry, then map the claims to an [`AuthContext`].
    pub fn verify(&self, token: &str) -> Result<AuthContext, String> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation)
            .map_err(|e| format!("Invalid session token: {}", e))?;
        let claims = data.claims;

        let profile_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| "Invalid session token: subject is not a profile id".to_string())?;
        let role = UserRole::parse(&claims.role)
            .ok_or_else(|| format!("Invalid session token: unknown role '{}'", claims.role))?;

        Ok(AuthContext::new(profile_id, role, claims.empresa_id))
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtVerifier([REDACTED])")
    }
}
