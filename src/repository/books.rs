//! Books (libros) repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::book::{Book, BookInput, BookQuery},
};

const DUPLICATE_ISBN: &str = "A book with this ISBN already exists";

/// Makes `%`, `_` and `\` match themselves in an `ILIKE ... ESCAPE '\'` pattern
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search books by free text (title, author, ISBN) and genre
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM libros
            WHERE ($1::text IS NULL
                   OR titulo ILIKE $1 ESCAPE '\'
                   OR autor ILIKE $1 ESCAPE '\'
                   OR isbn ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR genero ILIKE $2 ESCAPE '\')
            ORDER BY titulo
            "#,
        )
        .bind(query.q.as_deref().map(|q| format!("%{}%", escape_like(q))))
        .bind(query.genero.as_deref().map(escape_like))
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM libros WHERE id_libro = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM libros WHERE id_libro = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    /// Insert a normalized book; `titulo` and `autor` are checked by the caller
    pub async fn create(&self, book: &BookInput, idioma: &str) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO libros
                (isbn, titulo, autor, editorial, anio_publicacion, genero,
                 descripcion, portada_url, link, idioma, num_paginas)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.titulo)
        .bind(&book.autor)
        .bind(&book.editorial)
        .bind(book.anio_publicacion)
        .bind(&book.genero)
        .bind(&book.descripcion)
        .bind(&book.portada_url)
        .bind(&book.link)
        .bind(idioma)
        .bind(book.num_paginas)
        .fetch_one(&self.pool)
        .await
        .map_constraint(DUPLICATE_ISBN, "Book has dependent records")
    }

    /// Update the provided fields only
    pub async fn update(&self, id: i32, book: &BookInput) -> AppResult<Book> {
        let mut sets: Vec<String> = Vec::new();
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(book.isbn, "isbn");
        add_field!(book.titulo, "titulo");
        add_field!(book.autor, "autor");
        add_field!(book.editorial, "editorial");
        add_field!(book.anio_publicacion, "anio_publicacion");
        add_field!(book.genero, "genero");
        add_field!(book.descripcion, "descripcion");
        add_field!(book.portada_url, "portada_url");
        add_field!(book.link, "link");
        add_field!(book.idioma, "idioma");
        add_field!(book.num_paginas, "num_paginas");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE libros SET {} WHERE id_libro = $1", sets.join(", "));
        let mut builder = sqlx::query(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(book.isbn);
        bind_field!(book.titulo);
        bind_field!(book.autor);
        bind_field!(book.editorial);
        bind_field!(book.anio_publicacion);
        bind_field!(book.genero);
        bind_field!(book.descripcion);
        bind_field!(book.portada_url);
        bind_field!(book.link);
        bind_field!(book.idioma);
        bind_field!(book.num_paginas);

        let result = builder
            .execute(&self.pool)
            .await
            .map_constraint(DUPLICATE_ISBN, "Book has dependent records")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    /// Delete a book; copies and reservations cascade, loan history blocks
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM libros WHERE id_libro = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_constraint(DUPLICATE_ISBN, "Book has copies with loans and cannot be deleted")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("c_sharp"), "c\\_sharp");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("Cien años"), "Cien años");
    }
}
