//! Book (catalog title) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::non_empty;

/// Language stored when a book is created without one
pub const DEFAULT_LANGUAGE: &str = "Español";

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id_libro: i32,
    pub isbn: Option<String>,
    pub titulo: String,
    pub autor: String,
    pub editorial: Option<String>,
    pub anio_publicacion: Option<i32>,
    pub genero: Option<String>,
    pub descripcion: Option<String>,
    pub portada_url: Option<String>,
    pub link: Option<String>,
    pub idioma: Option<String>,
    pub num_paginas: Option<i32>,
    pub total_ejemplares: i32,
    pub ejemplares_disponibles: i32,
    pub created_at: DateTime<Utc>,
}

/// Book list filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Matches title, author or ISBN
    pub q: Option<String>,
    pub genero: Option<String>,
}

/// Create or update book request.
///
/// Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    pub isbn: Option<String>,
    pub titulo: Option<String>,
    pub autor: Option<String>,
    pub editorial: Option<String>,
    #[validate(range(min = 0, max = 9999, message = "Invalid publication year"))]
    pub anio_publicacion: Option<i32>,
    pub genero: Option<String>,
    pub descripcion: Option<String>,
    #[validate(url(message = "Invalid cover URL"))]
    pub portada_url: Option<String>,
    pub link: Option<String>,
    pub idioma: Option<String>,
    #[validate(range(min = 1, message = "Page count must be positive"))]
    pub num_paginas: Option<i32>,
}

impl BookInput {
    /// Blank text fields become `None`, zero numbers become `None`
    pub fn normalized(self) -> Self {
        Self {
            isbn: non_empty(self.isbn),
            titulo: non_empty(self.titulo),
            autor: non_empty(self.autor),
            editorial: non_empty(self.editorial),
            anio_publicacion: self.anio_publicacion.filter(|y| *y != 0),
            genero: non_empty(self.genero),
            descripcion: non_empty(self.descripcion),
            portada_url: non_empty(self.portada_url),
            link: non_empty(self.link),
            idioma: non_empty(self.idioma),
            num_paginas: self.num_paginas.filter(|n| *n != 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_drops_blank_fields() {
        let input = BookInput {
            titulo: Some("Ficciones".into()),
            autor: Some(" Jorge Luis Borges ".into()),
            isbn: Some("".into()),
            num_paginas: Some(0),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.autor.as_deref(), Some("Jorge Luis Borges"));
        assert_eq!(input.isbn, None);
        assert_eq!(input.num_paginas, None);
    }
}
