//! Business logic services

pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod loans;
pub mod notifications;
pub mod reservations;
pub mod states;
pub mod stats;
pub mod users;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub states: states::StatesService,
    pub reservations: reservations::ReservationsService,
    pub loans: loans::LoansService,
    pub notifications: notifications::NotificationsService,
    pub favorites: favorites::FavoritesService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            states: states::StatesService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), config.loans.clone()),
            notifications: notifications::NotificationsService::new(repository.clone()),
            favorites: favorites::FavoritesService::new(repository.clone()),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Database connectivity check
    pub async fn ready(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
