//! Favorite books and reviews (usuario_libros)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Favorite joined with the book it points to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Favorite {
    pub id_libro: i32,
    pub titulo: String,
    pub autor: String,
    pub portada_url: Option<String>,
    pub fecha_agregado: DateTime<Utc>,
    pub calificacion: Option<i16>,
    pub resena: Option<String>,
}

/// Add or update favorite request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpsertFavorite {
    pub id_libro: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub calificacion: Option<i16>,
    #[validate(length(max = 2000, message = "Review is too long"))]
    pub resena: Option<String>,
}
