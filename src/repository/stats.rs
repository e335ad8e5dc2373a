//! Statistics repository over the reporting views

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::stats::{GeneralStats, MostReservedBook},
};

#[derive(Clone)]
pub struct StatsRepository {
    pool: Pool<Postgres>,
}

impl StatsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn general(&self) -> AppResult<GeneralStats> {
        let stats = sqlx::query_as::<_, GeneralStats>("SELECT * FROM v_estadisticas_generales")
            .fetch_one(&self.pool)
            .await?;

        Ok(stats)
    }

    pub async fn most_reserved(&self, limit: i64) -> AppResult<Vec<MostReservedBook>> {
        let books = sqlx::query_as::<_, MostReservedBook>("SELECT * FROM v_libros_mas_reservados LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }
}
