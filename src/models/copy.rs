//! Copy (ejemplar, a physical copy of a book) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

text_enum! {
    /// Physical condition of a copy
    pub enum PhysicalCondition {
        Excelente => "excelente",
        Bueno => "bueno",
        Regular => "regular",
        Malo => "malo",
    }
}

impl Default for PhysicalCondition {
    fn default() -> Self {
        PhysicalCondition::Bueno
    }
}

/// Copy joined with the title of its book
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id_ejemplar: i32,
    pub id_libro: i32,
    pub codigo_ejemplar: String,
    pub ubicacion: Option<String>,
    pub estado_fisico: PhysicalCondition,
    /// False while a loan is open on this copy
    pub disponible: bool,
    pub observaciones: Option<String>,
    pub created_at: DateTime<Utc>,
    pub titulo_libro: String,
}

/// Create copy request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCopy {
    pub id_libro: Option<i32>,
    pub codigo_ejemplar: Option<String>,
    pub ubicacion: Option<String>,
    pub estado_fisico: Option<PhysicalCondition>,
    pub observaciones: Option<String>,
}

/// Update copy request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCopy {
    pub ubicacion: Option<String>,
    pub estado_fisico: Option<PhysicalCondition>,
    pub observaciones: Option<String>,
}
