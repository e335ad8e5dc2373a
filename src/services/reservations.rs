//! Reservation workflow service

use crate::{
    error::{AppError, AppResult},
    models::{
        non_empty,
        reservation::{
            ApproveReservation, CreateReservation, RejectReservation, Reservation, ReservationHistoryEntry,
        },
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ReservationsService {
    repository: Repository,
}

impl ReservationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        self.repository.reservations.list().await
    }

    pub async fn list_for_user(&self, claims: &UserClaims, id_usuario: i32) -> AppResult<Vec<Reservation>> {
        claims.require_self_or_admin(id_usuario)?;
        self.repository.reservations.list_for_user(id_usuario).await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<Reservation> {
        let reservation = self.repository.reservations.get_by_id(id).await?;
        claims.require_self_or_admin(reservation.id_usuario)?;
        Ok(reservation)
    }

    /// Reserve a book for the calling user
    pub async fn create(&self, claims: &UserClaims, request: CreateReservation) -> AppResult<()> {
        let id_libro = request
            .id_libro
            .ok_or_else(|| AppError::Validation("id_libro is required".to_string()))?;
        let notes = non_empty(request.observaciones_usuario);

        self.repository
            .reservations
            .create(claims.id, id_libro, notes.as_deref())
            .await?;
        tracing::info!(id_usuario = claims.id, id_libro, "Reservation created");
        Ok(())
    }

    pub async fn approve(&self, claims: &UserClaims, id: i32, request: ApproveReservation) -> AppResult<()> {
        let notes = non_empty(request.observaciones_admin);
        self.repository
            .reservations
            .approve(id, claims.id, notes.as_deref())
            .await?;
        tracing::info!(id_reserva = id, admin = claims.id, "Reservation approved");
        Ok(())
    }

    pub async fn reject(&self, claims: &UserClaims, id: i32, request: RejectReservation) -> AppResult<()> {
        let motivo = non_empty(request.motivo)
            .ok_or_else(|| AppError::Validation("motivo is required".to_string()))?;
        self.repository.reservations.reject(id, claims.id, &motivo).await?;
        tracing::info!(id_reserva = id, admin = claims.id, "Reservation rejected");
        Ok(())
    }

    /// Cancel one of the caller's own reservations
    pub async fn cancel(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        let current = self.repository.reservations.get_ref(id).await?;
        claims.require_self(current.id_usuario)?;

        self.repository.reservations.cancel(id, claims.id).await?;
        tracing::info!(id_reserva = id, id_usuario = claims.id, "Reservation cancelled");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.reservations.delete(id).await
    }

    /// History of a reservation; `[]` when it exists but has no entries
    pub async fn history(&self, claims: &UserClaims, id_reserva: i32) -> AppResult<Vec<ReservationHistoryEntry>> {
        let current = self.repository.reservations.get_ref(id_reserva).await?;
        claims.require_self_or_admin(current.id_usuario)?;
        self.repository.reservations.history(id_reserva).await
    }
}
