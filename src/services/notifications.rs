//! User notifications service

use crate::{
    error::{AppError, AppResult},
    models::{
        non_empty,
        notification::{CreateNotification, Notification},
        user::UserClaims,
    },
    repository::Repository,
};

const DEFAULT_KIND: &str = "general";

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_for_user(&self, claims: &UserClaims, id_usuario: i32) -> AppResult<Vec<Notification>> {
        claims.require_self_or_admin(id_usuario)?;
        self.repository.notifications.list_for_user(id_usuario).await
    }

    /// Only the recipient may mark a notification as read
    pub async fn mark_read(&self, claims: &UserClaims, id_usuario: i32, id_notificacion: i32) -> AppResult<Notification> {
        claims.require_self(id_usuario)?;
        self.repository
            .notifications
            .mark_read(id_usuario, id_notificacion)
            .await
    }

    pub async fn create(&self, request: CreateNotification) -> AppResult<Notification> {
        let (Some(id_usuario), Some(asunto), Some(mensaje)) =
            (request.id_usuario, non_empty(request.asunto), non_empty(request.mensaje))
        else {
            return Err(AppError::Validation("id_usuario, asunto and mensaje are required".to_string()));
        };
        let tipo = non_empty(request.tipo).unwrap_or_else(|| DEFAULT_KIND.to_string());

        self.repository
            .notifications
            .create(id_usuario, &tipo, &asunto, &mensaje)
            .await
    }

    pub async fn delete(&self, claims: &UserClaims, id_usuario: i32, id_notificacion: i32) -> AppResult<()> {
        claims.require_self_or_admin(id_usuario)?;
        self.repository
            .notifications
            .delete(id_usuario, id_notificacion)
            .await
    }
}
