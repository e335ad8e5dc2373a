//! State (estado) model: named statuses used by loans and reservations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Seeded loan state names the loan workflow looks up
pub const LOANED_STATE: &str = "Prestado";
pub const RETURNED_STATE: &str = "Devuelto";

text_enum! {
    /// Which workflow a state belongs to
    pub enum StateKind {
        Prestamo => "prestamo",
        Reserva => "reserva",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StateRecord {
    pub id_estado: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub tipo: StateKind,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create or update state request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StateInput {
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    /// Raw value so an unknown kind is reported as a 400 with a clear message
    pub tipo: Option<String>,
    pub color: Option<String>,
}
