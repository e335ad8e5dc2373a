//! Statistics service

use crate::{
    error::AppResult,
    models::stats::{GeneralStats, MostReservedBook},
    repository::Repository,
};

/// Rows returned by the most reserved books report
const MOST_RESERVED_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn general(&self) -> AppResult<GeneralStats> {
        self.repository.stats.general().await
    }

    pub async fn most_reserved(&self) -> AppResult<Vec<MostReservedBook>> {
        self.repository.stats.most_reserved(MOST_RESERVED_LIMIT).await
    }
}
