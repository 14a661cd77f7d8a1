//! Actix-web extractor for bearer session tokens.

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError, web};
use std::future::{Ready, ready};

use super::{AuthContext, JwtVerifier};
use crate::config::AUTHORIZATION_HEADER;
use crate::error::ErrorResponse;

/// Authentication error for extractors.
#[derive(Debug)]
pub struct AuthError {
    message: String,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::UNAUTHORIZED).json(ErrorResponse {
            error: "UNAUTHORIZED".to_string(),
            message: self.message.clone(),
        })
    }
}

/// Extractor that requires a valid session token.
///
/// ```ignore
/// async fn protected_handler(auth: SessionAuth) -> impl Responder {
///     // auth.ctx is the caller's AuthContext
/// }
/// ```
///
/// The verified profile id is also stored in request extensions so the
/// request logger can report it. The token itself is never logged.
pub struct SessionAuth {
    pub ctx: AuthContext,
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequest for SessionAuth {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(verifier) = req.app_data::<web::Data<JwtVerifier>>() else {
            return ready(Err(AuthError {
                message: "Internal configuration error".to_string(),
            }));
        };

        let Some(token) = bearer_token(req) else {
            return ready(Err(AuthError {
                message: "Missing session token. Provide Authorization: Bearer <token>."
                    .to_string(),
            }));
        };

        match verifier.verify(token) {
            Ok(ctx) => {
                req.extensions_mut().insert(ctx.clone());
                ready(Ok(SessionAuth { ctx }))
            }
            Err(message) => ready(Err(AuthError { message })),
        }
    }
}
