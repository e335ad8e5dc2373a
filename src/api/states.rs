//! State (estado) endpoints, administrators only

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::state::{StateInput, StateRecord},
};

use super::{AdminUser, ApiJson, ApiPath, MessageResponse};

#[utoipa::path(
    get,
    path = "/estados",
    tag = "states",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All states", body = Vec<StateRecord>))
)]
pub async fn list_states(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<StateRecord>>> {
    let states = state.services.states.list().await?;
    Ok(Json(states))
}

#[utoipa::path(
    get,
    path = "/estados/{id}",
    tag = "states",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "State ID")),
    responses(
        (status = 200, description = "State details", body = StateRecord),
        (status = 404, description = "State not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_state(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<StateRecord>> {
    let record = state.services.states.get(id).await?;
    Ok(Json(record))
}

#[utoipa::path(
    post,
    path = "/estados",
    tag = "states",
    security(("bearer_auth" = [])),
    request_body = StateInput,
    responses(
        (status = 201, description = "State created", body = StateRecord),
        (status = 400, description = "Missing fields, unknown tipo or duplicate name", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_state(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(input): ApiJson<StateInput>,
) -> AppResult<(StatusCode, Json<StateRecord>)> {
    let record = state.services.states.create(input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    put,
    path = "/estados/{id}",
    tag = "states",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "State ID")),
    request_body = StateInput,
    responses(
        (status = 200, description = "State updated", body = StateRecord),
        (status = 404, description = "State not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_state(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(input): ApiJson<StateInput>,
) -> AppResult<Json<StateRecord>> {
    let record = state.services.states.update(id, input).await?;
    Ok(Json(record))
}

#[utoipa::path(
    delete,
    path = "/estados/{id}",
    tag = "states",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "State ID")),
    responses(
        (status = 200, description = "State deleted", body = MessageResponse),
        (status = 409, description = "State referenced by loans", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_state(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.states.delete(id).await?;
    Ok(Json(MessageResponse::new("State deleted")))
}
