//! Notification endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::notification::{CreateNotification, Notification},
};

use super::{AdminUser, ApiJson, ApiPath, AuthenticatedUser, MessageResponse};

#[utoipa::path(
    get,
    path = "/notificaciones/{id_usuario}",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id_usuario" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Notifications, newest first", body = Vec<Notification>),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_notifications(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_usuario): ApiPath<i32>,
) -> AppResult<Json<Vec<Notification>>> {
    let notifications = state.services.notifications.list_for_user(&claims, id_usuario).await?;
    Ok(Json(notifications))
}

#[utoipa::path(
    put,
    path = "/notificaciones/{id_usuario}/{id_notificacion}/leida",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id_usuario" = i32, Path, description = "User ID"),
        ("id_notificacion" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 403, description = "Not the recipient", body = crate::error::ErrorResponse),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_notification_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((id_usuario, id_notificacion)): ApiPath<(i32, i32)>,
) -> AppResult<Json<Notification>> {
    let notification = state
        .services
        .notifications
        .mark_read(&claims, id_usuario, id_notificacion)
        .await?;
    Ok(Json(notification))
}

/// Send a notification to a user
#[utoipa::path(
    post,
    path = "/notificaciones",
    tag = "notifications",
    security(("bearer_auth" = [])),
    request_body = CreateNotification,
    responses(
        (status = 201, description = "Notification created", body = Notification),
        (status = 400, description = "Missing fields or unknown user", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_notification(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiJson(request): ApiJson<CreateNotification>,
) -> AppResult<(StatusCode, Json<Notification>)> {
    let notification = state.services.notifications.create(request).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

#[utoipa::path(
    delete,
    path = "/notificaciones/{id_usuario}/{id_notificacion}",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("id_usuario" = i32, Path, description = "User ID"),
        ("id_notificacion" = i32, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification deleted", body = MessageResponse),
        (status = 404, description = "Notification not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_notification(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath((id_usuario, id_notificacion)): ApiPath<(i32, i32)>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .notifications
        .delete(&claims, id_usuario, id_notificacion)
        .await?;
    Ok(Json(MessageResponse::new("Notification deleted")))
}
