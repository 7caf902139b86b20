//! Authentication HTTP handlers
//!
//! Registration, login (session issuance), and logout.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub is_officer: bool,
}

/// Response for a newly registered user
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub is_officer: bool,
}

/// POST /auth/register - Create a new user
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .auth_service
        .register(&req.username, &req.password, req.is_officer)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            is_officer: user.is_officer,
        }),
    ))
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response carrying the issued session token
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub id: String,
    pub is_officer: bool,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// POST /auth/login - Verify credentials and issue a session
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.auth_service.login(&req.username, &req.password).await?;

    let session = state.sessions.create(&user.id, user.is_officer);

    Ok(Json(LoginResponse {
        id: user.id,
        is_officer: user.is_officer,
        access_token: session.key,
        expires_at: session.expires_at,
    }))
}

/// POST /auth/logout - Revoke the current session
pub async fn logout(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<StatusCode, ApiError> {
    state.sessions.remove(&principal.session_key);
    Ok(StatusCode::NO_CONTENT)
}
