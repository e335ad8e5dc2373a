//! Copy (ejemplar) endpoints, administrators only

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::copy::{BookCopy, CreateCopy, UpdateCopy},
};

use super::{AdminUser, ApiJson, ApiPath, MessageResponse};

#[utoipa::path(
    get,
    path = "/ejemplares",
    tag = "copies",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All copies", body = Vec<BookCopy>))
)]
pub async fn list_copies(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<BookCopy>>> {
    let copies = state.services.catalog.list_copies().await?;
    Ok(Json(copies))
}

#[utoipa::path(
    get,
    path = "/ejemplares/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy details", body = BookCopy),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_copy(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<BookCopy>> {
    let copy = state.services.catalog.get_copy(id).await?;
    Ok(Json(copy))
}

#[utoipa::path(
    post,
    path = "/ejemplares",
    tag = "copies",
    security(("bearer_auth" = [])),
    request_body = CreateCopy,
    responses(
        (status = 201, description = "Copy created", body = BookCopy),
        (status = 400, description = "Missing fields, duplicate code or unknown book", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_copy(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(request): ApiJson<CreateCopy>,
) -> AppResult<(StatusCode, Json<BookCopy>)> {
    let copy = state.services.catalog.create_copy(request).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

#[utoipa::path(
    put,
    path = "/ejemplares/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    request_body = UpdateCopy,
    responses(
        (status = 200, description = "Copy updated", body = BookCopy),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_copy(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateCopy>,
) -> AppResult<Json<BookCopy>> {
    let copy = state.services.catalog.update_copy(id, request).await?;
    Ok(Json(copy))
}

#[utoipa::path(
    delete,
    path = "/ejemplares/{id}",
    tag = "copies",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Copy ID")),
    responses(
        (status = 200, description = "Copy deleted", body = MessageResponse),
        (status = 404, description = "Copy not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Copy has loan history", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_copy(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.catalog.delete_copy(id).await?;
    Ok(Json(MessageResponse::new("Copy deleted")))
}
