//! Authentication endpoints

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        non_empty,
        user::{AccountStatus, Role, UserClaims},
    },
};

use super::{ApiJson, AuthenticatedUser};

/// Login request
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub correo: Option<String>,
    pub password: Option<String>,
}

/// Account summary returned on login
#[derive(Serialize, ToSchema)]
pub struct SessionUser {
    pub id: i32,
    pub nombre_completo: String,
    pub correo: String,
    pub role: Role,
    pub estado_cuenta: AccountStatus,
}

/// Login response with JWT token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: SessionUser,
}

/// Session check response
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub user: UserClaims,
}

/// Authenticate with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = crate::error::ErrorResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse),
        (status = 403, description = "Account not active", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(correo), Some(password)) = (non_empty(request.correo), request.password.filter(|p| !p.is_empty()))
    else {
        return Err(AppError::Validation("correo and password are required".to_string()));
    };

    let (token, user) = state.services.auth.login(&correo, &password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: SessionUser {
            id: user.id_usuario,
            nombre_completo: user.nombre_completo,
            correo: user.correo,
            role: user.role,
            estado_cuenta: user.estado_cuenta,
        },
    }))
}

/// Check the current token and return its claims
#[utoipa::path(
    get,
    path = "/verificar-sesion",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Valid session", body = SessionResponse),
        (status = 401, description = "Missing or invalid token", body = crate::error::ErrorResponse)
    )
)]
pub async fn verify_session(AuthenticatedUser(claims): AuthenticatedUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        message: "Valid session".to_string(),
        user: claims,
    })
}
