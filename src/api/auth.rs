//! Admin panel login

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::{TOKEN_EXPIRY_HOURS, create_token};
use crate::error::ApiError;
use crate::state::AppState;

use super::ApiResult;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: String,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let password_ok = req
        .password
        .as_deref()
        .is_some_and(|p| p == state.admin_password);
    if !password_ok {
        return Err(ApiError::Unauthorized("Invalid password".into()));
    }

    let token = create_token(&state.jwt_secret)?;
    Ok(Json(LoginResponse {
        token,
        expires_in: format!("{TOKEN_EXPIRY_HOURS}h"),
    }))
}
