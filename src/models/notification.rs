//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id_notificacion: i32,
    pub id_usuario: i32,
    pub tipo: String,
    pub asunto: String,
    pub mensaje: String,
    pub leida: bool,
    pub created_at: DateTime<Utc>,
}

/// Create notification request (admin)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateNotification {
    pub id_usuario: Option<i32>,
    pub tipo: Option<String>,
    pub asunto: Option<String>,
    pub mensaje: Option<String>,
}
