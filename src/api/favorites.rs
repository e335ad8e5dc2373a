//! Favorite books and reviews endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::favorite::{Favorite, UpsertFavorite},
};

use super::{ApiJson, ApiPath, AuthenticatedUser, MessageResponse};

#[utoipa::path(
    get,
    path = "/usuarios/{id}/favoritos",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Favorite books", body = Vec<Favorite>),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_favorites(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_usuario): ApiPath<i32>,
) -> AppResult<Json<Vec<Favorite>>> {
    let favorites = state.services.favorites.list(&claims, id_usuario).await?;
    Ok(Json(favorites))
}

/// Add a favorite or update its rating and review
#[utoipa::path(
    post,
    path = "/usuarios/{id}/favoritos",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpsertFavorite,
    responses(
        (status = 201, description = "Favorite saved", body = Favorite),
        (status = 400, description = "Missing book or rating out of range", body = crate::error::ErrorResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn upsert_favorite(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_usuario): ApiPath<i32>,
    ApiJson(request): ApiJson<UpsertFavorite>,
) -> AppResult<(StatusCode, Json<Favorite>)> {
    let favorite = state.services.favorites.upsert(&claims, id_usuario, request).await?;
    Ok((StatusCode::CREATED, Json(favorite)))
}

#[utoipa::path(
    delete,
    path = "/usuarios/{id}/favoritos/{id_libro}",
    tag = "favorites",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        ("id_libro" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Favorite removed", body = MessageResponse),
        (status = 404, description = "Favorite not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_favorite(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((id_usuario, id_libro)): ApiPath<(i32, i32)>,
) -> AppResult<Json<MessageResponse>> {
    state.services.favorites.remove(&claims, id_usuario, id_libro).await?;
    Ok(Json(MessageResponse::new("Favorite removed")))
}
