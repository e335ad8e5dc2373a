//! Notifications repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::notification::Notification,
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Notifications of a user, newest first
    pub async fn list_for_user(&self, id_usuario: i32) -> AppResult<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notificaciones WHERE id_usuario = $1 ORDER BY created_at DESC, id_notificacion DESC",
        )
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    pub async fn create(&self, id_usuario: i32, tipo: &str, asunto: &str, mensaje: &str) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notificaciones (id_usuario, tipo, asunto, mensaje)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(id_usuario)
        .bind(tipo)
        .bind(asunto)
        .bind(mensaje)
        .fetch_one(&self.pool)
        .await
        .map_reference("Notification already exists", "User does not exist")
    }

    pub async fn mark_read(&self, id_usuario: i32, id_notificacion: i32) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notificaciones SET leida = TRUE
            WHERE id_notificacion = $1 AND id_usuario = $2
            RETURNING *
            "#,
        )
        .bind(id_notificacion)
        .bind(id_usuario)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification with id {} not found", id_notificacion)))
    }

    pub async fn delete(&self, id_usuario: i32, id_notificacion: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notificaciones WHERE id_notificacion = $1 AND id_usuario = $2")
            .bind(id_notificacion)
            .bind(id_usuario)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Notification with id {} not found",
                id_notificacion
            )));
        }

        Ok(())
    }
}
