//! HTTP handlers
//!
//! The HTTP adapter around the lifecycle engine: request extraction,
//! principal resolution from the session store, and translation of the
//! domain error taxonomy into transport status codes (via `ApiError`).

mod auth;
mod loan;

pub use auth::*;
pub use loan::*;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::session::SessionStore;

/// The resolved calling identity
///
/// Extracted from the bearer token before any handler runs; the lifecycle
/// engine only ever sees the principal id.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: String,
    pub is_officer: bool,
    pub session_key: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    Arc<SessionStore>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| ApiError::Unauthorized("missing bearer token".to_string()))?;

        let sessions = Arc::<SessionStore>::from_ref(state);
        let session = sessions
            .get(bearer.token())
            .ok_or_else(|| ApiError::Unauthorized("session not found or expired".to_string()))?;

        Ok(Principal {
            user_id: session.user_id,
            is_officer: session.is_officer,
            session_key: session.key,
        })
    }
}
