//! Copies (ejemplares) repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::copy::{BookCopy, PhysicalCondition, UpdateCopy},
};

const COPY_SELECT: &str = r#"
    SELECT e.id_ejemplar, e.id_libro, e.codigo_ejemplar, e.ubicacion, e.estado_fisico,
           e.disponible, e.observaciones, e.created_at, l.titulo AS titulo_libro
    FROM ejemplares e
    JOIN libros l ON l.id_libro = e.id_libro
"#;

const DUPLICATE_CODE: &str = "A copy with this code already exists";

#[derive(Clone)]
pub struct CopiesRepository {
    pool: Pool<Postgres>,
}

impl CopiesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(&format!(
            "{} ORDER BY l.titulo, e.codigo_ejemplar",
            COPY_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    pub async fn list_for_book(&self, id_libro: i32) -> AppResult<Vec<BookCopy>> {
        let copies = sqlx::query_as::<_, BookCopy>(&format!(
            "{} WHERE e.id_libro = $1 ORDER BY e.codigo_ejemplar",
            COPY_SELECT
        ))
        .bind(id_libro)
        .fetch_all(&self.pool)
        .await?;

        Ok(copies)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookCopy> {
        sqlx::query_as::<_, BookCopy>(&format!("{} WHERE e.id_ejemplar = $1", COPY_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", id)))
    }

    /// Insert a copy. The counter trigger updates the book totals.
    pub async fn create(
        &self,
        id_libro: i32,
        codigo_ejemplar: &str,
        ubicacion: Option<&str>,
        estado_fisico: PhysicalCondition,
        observaciones: Option<&str>,
    ) -> AppResult<BookCopy> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO ejemplares (id_libro, codigo_ejemplar, ubicacion, estado_fisico, observaciones)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id_ejemplar
            "#,
        )
        .bind(id_libro)
        .bind(codigo_ejemplar)
        .bind(ubicacion)
        .bind(estado_fisico)
        .bind(observaciones)
        .fetch_one(&self.pool)
        .await
        .map_reference(DUPLICATE_CODE, "Book does not exist")?;

        self.get_by_id(id).await
    }

    pub async fn update(&self, id: i32, copy: &UpdateCopy) -> AppResult<BookCopy> {
        let result = sqlx::query(
            r#"
            UPDATE ejemplares
            SET ubicacion = COALESCE($2, ubicacion),
                estado_fisico = COALESCE($3, estado_fisico),
                observaciones = COALESCE($4, observaciones)
            WHERE id_ejemplar = $1
            "#,
        )
        .bind(id)
        .bind(&copy.ubicacion)
        .bind(copy.estado_fisico)
        .bind(&copy.observaciones)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM ejemplares WHERE id_ejemplar = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_constraint(DUPLICATE_CODE, "Copy has loan history and cannot be deleted")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy with id {} not found", id)));
        }

        Ok(())
    }
}
