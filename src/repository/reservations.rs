//! Reservations repository.
//!
//! Create, approve and reject go through the stored procedures, which raise
//! rule violations as SQLSTATE `P0001`. Cancellation is a guarded update
//! run here so that it writes its history row in the same transaction.

use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationHistoryEntry, ReservationRef, ReservationStatus},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

/// Lock a reservation row for a state transition
pub async fn lock_ref<'e, E>(executor: E, id: i32) -> AppResult<ReservationRef>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ReservationRef>(
        "SELECT id_reserva, id_usuario, id_libro, estado FROM reservas WHERE id_reserva = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
}

/// Append a transition to the reservation history
pub async fn record_history<'e, E>(
    executor: E,
    id_reserva: i32,
    from: Option<ReservationStatus>,
    to: ReservationStatus,
    actor: i32,
    comentario: Option<&str>,
) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO historial_reservas
            (id_reserva, estado_anterior, estado_nuevo, usuario_responsable, comentario)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id_reserva)
    .bind(from)
    .bind(to)
    .bind(actor)
    .bind(comentario)
    .execute(executor)
    .await?;

    Ok(())
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM v_reservas_completas ORDER BY fecha_reserva DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    pub async fn list_for_user(&self, id_usuario: i32) -> AppResult<Vec<Reservation>> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM v_reservas_completas WHERE id_usuario = $1 ORDER BY fecha_reserva DESC",
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;

        Ok(reservations)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM v_reservas_completas WHERE id_reserva = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Owner and status without the joined columns
    pub async fn get_ref(&self, id: i32) -> AppResult<ReservationRef> {
        sqlx::query_as::<_, ReservationRef>(
            "SELECT id_reserva, id_usuario, id_libro, estado FROM reservas WHERE id_reserva = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    pub async fn create(&self, id_usuario: i32, id_libro: i32, observaciones: Option<&str>) -> AppResult<()> {
        sqlx::query("CALL crear_reserva($1, $2, $3)")
            .bind(id_usuario)
            .bind(id_libro)
            .bind(observaciones)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn approve(&self, id: i32, id_admin: i32, observaciones: Option<&str>) -> AppResult<()> {
        sqlx::query("CALL aprobar_reserva($1, $2, $3)")
            .bind(id)
            .bind(id_admin)
            .bind(observaciones)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn reject(&self, id: i32, id_admin: i32, motivo: &str) -> AppResult<()> {
        sqlx::query("CALL rechazar_reserva($1, $2, $3)")
            .bind(id)
            .bind(id_admin)
            .bind(motivo)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Cancel a pending or approved reservation
    pub async fn cancel(&self, id: i32, actor: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let current = lock_ref(&mut *tx, id).await?;
        if !current.estado.can_cancel() {
            return Err(AppError::BusinessRule(format!(
                "Only pending or approved reservations can be cancelled (current: {})",
                current.estado
            )));
        }

        sqlx::query("UPDATE reservas SET estado = $2 WHERE id_reserva = $1")
            .bind(id)
            .bind(ReservationStatus::Cancelada)
            .execute(&mut *tx)
            .await?;

        record_history(
            &mut *tx,
            id,
            Some(current.estado),
            ReservationStatus::Cancelada,
            actor,
            Some("Cancelled by user"),
        )
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM reservas WHERE id_reserva = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation with id {} not found", id)));
        }

        Ok(())
    }

    /// History of one reservation, oldest first
    pub async fn history(&self, id_reserva: i32) -> AppResult<Vec<ReservationHistoryEntry>> {
        let entries = sqlx::query_as::<_, ReservationHistoryEntry>(
            r#"
            SELECT h.id_historial, h.id_reserva, h.estado_anterior, h.estado_nuevo,
                   h.usuario_responsable, h.comentario, h.created_at,
                   u.nombre_completo AS nombre_usuario_responsable
            FROM historial_reservas h
            LEFT JOIN usuarios u ON u.id_usuario = h.usuario_responsable
            WHERE h.id_reserva = $1
            ORDER BY h.created_at, h.id_historial
            "#,
        )
        .bind(id_reserva)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
