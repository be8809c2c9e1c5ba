use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

const INVALID_AUTH: &str = "Authentication invalid";

/// Resolves a bearer token to the id of the user it was issued to.
/// Issuing tokens is somebody else's job.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Option<String>, AppError>;
}

/// Fixed token table, loaded from `API_TOKENS`.
#[derive(Clone, Debug, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, String>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<String>, AppError> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// The authenticated caller, inserted by [`require_auth`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated(INVALID_AUTH.to_string()))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = request.into_parts();

    let Some(token) = bearer_token(&parts) else {
        warn!("rejected {} {}: missing bearer token", parts.method, parts.uri);
        return Err(AppError::Unauthenticated(INVALID_AUTH.to_string()));
    };

    let Some(user_id) = state.verifier.verify(token).await? else {
        warn!("rejected {} {}: unknown token", parts.method, parts.uri);
        return Err(AppError::Unauthenticated(INVALID_AUTH.to_string()));
    };

    parts.extensions.insert(AuthUser { user_id });
    Ok(next.run(Request::from_parts(parts, body)).await)
}
