//! Reservation endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::reservation::{
        ApproveReservation, CreateReservation, RejectReservation, Reservation, ReservationHistoryEntry,
    },
};

use super::{AdminUser, ApiJson, ApiPath, AuthenticatedUser, MessageResponse, OptionalJson};

/// List all reservations
#[utoipa::path(
    get,
    path = "/reservas",
    tag = "reservations",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All reservations", body = Vec<Reservation>))
)]
pub async fn list_reservations(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list().await?;
    Ok(Json(reservations))
}

/// Reservations of one user
#[utoipa::path(
    get,
    path = "/reservas/usuario/{id_usuario}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id_usuario" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User reservations", body = Vec<Reservation>),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_user_reservations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_usuario): ApiPath<i32>,
) -> AppResult<Json<Vec<Reservation>>> {
    let reservations = state.services.reservations.list_for_user(&claims, id_usuario).await?;
    Ok(Json(reservations))
}

#[utoipa::path(
    get,
    path = "/reservas/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = Reservation),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<Reservation>> {
    let reservation = state.services.reservations.get(&claims, id).await?;
    Ok(Json(reservation))
}

/// Reserve a book for the authenticated user
#[utoipa::path(
    post,
    path = "/reservas",
    tag = "reservations",
    security(("bearer_auth" = [])),
    request_body = CreateReservation,
    responses(
        (status = 201, description = "Reservation created", body = MessageResponse),
        (status = 400, description = "Missing book or reservation rule violated", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiJson(request): ApiJson<CreateReservation>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    state.services.reservations.create(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Reservation created"))))
}

#[utoipa::path(
    put,
    path = "/reservas/{id}/aprobar",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = ApproveReservation,
    responses(
        (status = 200, description = "Reservation approved", body = MessageResponse),
        (status = 400, description = "Not pending or no copies available", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_reservation(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    OptionalJson(request): OptionalJson<ApproveReservation>,
) -> AppResult<Json<MessageResponse>> {
    state.services.reservations.approve(&admin, id, request).await?;
    Ok(Json(MessageResponse::new("Reservation approved")))
}

#[utoipa::path(
    put,
    path = "/reservas/{id}/rechazar",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    request_body = RejectReservation,
    responses(
        (status = 200, description = "Reservation rejected", body = MessageResponse),
        (status = 400, description = "Missing motivo or not pending", body = crate::error::ErrorResponse)
    )
)]
pub async fn reject_reservation(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<RejectReservation>,
) -> AppResult<Json<MessageResponse>> {
    state.services.reservations.reject(&admin, id, request).await?;
    Ok(Json(MessageResponse::new("Reservation rejected")))
}

/// Cancel one of your own reservations
#[utoipa::path(
    put,
    path = "/reservas/{id}/cancelar",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = MessageResponse),
        (status = 400, description = "Reservation cannot be cancelled", body = crate::error::ErrorResponse),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn cancel_reservation(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.reservations.cancel(&claims, id).await?;
    Ok(Json(MessageResponse::new("Reservation cancelled")))
}

#[utoipa::path(
    delete,
    path = "/reservas/{id}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation deleted", body = MessageResponse),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_reservation(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.reservations.delete(id).await?;
    Ok(Json(MessageResponse::new("Reservation deleted")))
}

/// Transition history of a reservation
#[utoipa::path(
    get,
    path = "/historial_reservas/{id_reserva}",
    tag = "reservations",
    security(("bearer_auth" = [])),
    params(("id_reserva" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "History entries, oldest first", body = Vec<ReservationHistoryEntry>),
        (status = 404, description = "Reservation not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn reservation_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_reserva): ApiPath<i32>,
) -> AppResult<Json<Vec<ReservationHistoryEntry>>> {
    let history = state.services.reservations.history(&claims, id_reserva).await?;
    Ok(Json(history))
}
