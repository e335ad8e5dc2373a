//! Favorites and reviews (usuario_libros) repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::favorite::Favorite,
};

const FAVORITE_SELECT: &str = r#"
    SELECT f.id_libro, l.titulo, l.autor, l.portada_url,
           f.fecha_agregado, f.calificacion, f.resena
    FROM usuario_libros f
    JOIN libros l ON l.id_libro = f.id_libro
"#;

#[derive(Clone)]
pub struct FavoritesRepository {
    pool: Pool<Postgres>,
}

impl FavoritesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_for_user(&self, id_usuario: i32) -> AppResult<Vec<Favorite>> {
        let favorites = sqlx::query_as::<_, Favorite>(&format!(
            "{} WHERE f.id_usuario = $1 ORDER BY f.fecha_agregado DESC",
            FAVORITE_SELECT
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;

        Ok(favorites)
    }

    /// Add a favorite, or replace the rating and review of an existing one
    pub async fn upsert(
        &self,
        id_usuario: i32,
        id_libro: i32,
        calificacion: Option<i16>,
        resena: Option<&str>,
    ) -> AppResult<Favorite> {
        sqlx::query(
            r#"
            INSERT INTO usuario_libros (id_usuario, id_libro, calificacion, resena)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id_usuario, id_libro)
            DO UPDATE SET calificacion = EXCLUDED.calificacion, resena = EXCLUDED.resena
            "#,
        )
        .bind(id_usuario)
        .bind(id_libro)
        .bind(calificacion)
        .bind(resena)
        .execute(&self.pool)
        .await?;

        sqlx::query_as::<_, Favorite>(&format!(
            "{} WHERE f.id_usuario = $1 AND f.id_libro = $2",
            FAVORITE_SELECT
        ))
        .bind(id_usuario)
        .bind(id_libro)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    pub async fn delete(&self, id_usuario: i32, id_libro: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM usuario_libros WHERE id_usuario = $1 AND id_libro = $2")
            .bind(id_usuario)
            .bind(id_libro)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }

        Ok(())
    }
}
