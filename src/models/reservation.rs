//! Reservation model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    /// Reservation lifecycle status
    pub enum ReservationStatus {
        Pendiente => "pendiente",
        Aprobada => "aprobada",
        Rechazada => "rechazada",
        Cancelada => "cancelada",
        Cumplida => "cumplida",
        Expirada => "expirada",
    }
}

impl ReservationStatus {
    /// Pending and approved reservations still hold a claim on the book
    pub fn is_active(&self) -> bool {
        matches!(self, ReservationStatus::Pendiente | ReservationStatus::Aprobada)
    }

    /// Whether the owner may still cancel
    pub fn can_cancel(&self) -> bool {
        self.is_active()
    }

    /// Whether a loan may fulfill the reservation
    pub fn can_fulfill(&self) -> bool {
        *self == ReservationStatus::Aprobada
    }
}

/// Reservation as exposed by `v_reservas_completas`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id_reserva: i32,
    pub id_usuario: i32,
    pub id_libro: i32,
    pub estado: ReservationStatus,
    pub fecha_reserva: DateTime<Utc>,
    pub fecha_aprobacion: Option<DateTime<Utc>>,
    pub fecha_expiracion: Option<DateTime<Utc>>,
    pub admin_aprobador: Option<i32>,
    pub observaciones_usuario: Option<String>,
    pub observaciones_admin: Option<String>,
    pub motivo_rechazo: Option<String>,
    pub nombre_usuario: String,
    pub correo_usuario: String,
    pub titulo_libro: String,
    pub autor_libro: String,
    pub isbn: Option<String>,
    pub nombre_admin: Option<String>,
}

/// Minimal reservation row used for ownership and state checks
#[derive(Debug, Clone, FromRow)]
pub struct ReservationRef {
    pub id_reserva: i32,
    pub id_usuario: i32,
    pub id_libro: i32,
    pub estado: ReservationStatus,
}

/// History entry written on each transition
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReservationHistoryEntry {
    pub id_historial: i32,
    pub id_reserva: i32,
    pub estado_anterior: Option<ReservationStatus>,
    pub estado_nuevo: ReservationStatus,
    pub usuario_responsable: Option<i32>,
    pub comentario: Option<String>,
    pub created_at: DateTime<Utc>,
    pub nombre_usuario_responsable: Option<String>,
}

/// Create reservation request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateReservation {
    pub id_libro: Option<i32>,
    pub observaciones_usuario: Option<String>,
}

/// Approve reservation request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveReservation {
    pub observaciones_admin: Option<String>,
}

/// Reject reservation request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectReservation {
    pub motivo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_guards() {
        assert!(ReservationStatus::Pendiente.can_cancel());
        assert!(ReservationStatus::Aprobada.can_cancel());
        assert!(!ReservationStatus::Cumplida.can_cancel());
        assert!(!ReservationStatus::Rechazada.can_cancel());

        assert!(ReservationStatus::Aprobada.can_fulfill());
        assert!(!ReservationStatus::Pendiente.can_fulfill());
        assert!(!ReservationStatus::Expirada.is_active());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ReservationStatus::Cumplida).unwrap();
        assert_eq!(json, "\"cumplida\"");
    }
}
