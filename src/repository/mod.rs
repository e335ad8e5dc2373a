//! Repository layer for database operations

pub mod books;
pub mod copies;
pub mod favorites;
pub mod loans;
pub mod notifications;
pub mod reservations;
pub mod states;
pub mod stats;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub books: books::BooksRepository,
    pub copies: copies::CopiesRepository,
    pub states: states::StatesRepository,
    pub reservations: reservations::ReservationsRepository,
    pub loans: loans::LoansRepository,
    pub notifications: notifications::NotificationsRepository,
    pub favorites: favorites::FavoritesRepository,
    pub stats: stats::StatsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            copies: copies::CopiesRepository::new(pool.clone()),
            states: states::StatesRepository::new(pool.clone()),
            reservations: reservations::ReservationsRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            favorites: favorites::FavoritesRepository::new(pool.clone()),
            stats: stats::StatsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round trip to the database, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
