//! Favorites and reviews service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        favorite::{Favorite, UpsertFavorite},
        non_empty,
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct FavoritesService {
    repository: Repository,
}

impl FavoritesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, claims: &UserClaims, id_usuario: i32) -> AppResult<Vec<Favorite>> {
        claims.require_self_or_admin(id_usuario)?;
        self.repository.favorites.list_for_user(id_usuario).await
    }

    /// Add a book to the caller's favorites, or update its rating and review
    pub async fn upsert(&self, claims: &UserClaims, id_usuario: i32, request: UpsertFavorite) -> AppResult<Favorite> {
        claims.require_self(id_usuario)?;
        let id_libro = request
            .id_libro
            .ok_or_else(|| AppError::Validation("id_libro is required".to_string()))?;
        request.validate()?;

        if !self.repository.books.exists(id_libro).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id_libro)));
        }

        let resena = non_empty(request.resena);
        self.repository
            .favorites
            .upsert(id_usuario, id_libro, request.calificacion, resena.as_deref())
            .await
    }

    pub async fn remove(&self, claims: &UserClaims, id_usuario: i32, id_libro: i32) -> AppResult<()> {
        claims.require_self(id_usuario)?;
        self.repository.favorites.delete(id_usuario, id_libro).await
    }
}
