//! States (estados) repository

use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::state::{StateKind, StateRecord},
};

const DUPLICATE_STATE: &str = "A state with this name already exists for this type";
const STATE_IN_USE: &str = "State is referenced by loans and cannot be deleted";

#[derive(Clone)]
pub struct StatesRepository {
    pool: Pool<Postgres>,
}

/// Validated state fields
#[derive(Debug)]
pub struct StateFields<'a> {
    pub nombre: &'a str,
    pub descripcion: Option<&'a str>,
    pub tipo: StateKind,
    pub color: Option<&'a str>,
}

/// Look up a state id by name within a kind, on any executor
pub async fn find_id<'e, E>(executor: E, nombre: &str, tipo: StateKind) -> AppResult<Option<i32>>
where
    E: PgExecutor<'e>,
{
    let id = sqlx::query_scalar::<_, i32>("SELECT id_estado FROM estados WHERE nombre = $1 AND tipo = $2")
        .bind(nombre)
        .bind(tipo)
        .fetch_optional(executor)
        .await?;

    Ok(id)
}

impl StatesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<StateRecord>> {
        let states = sqlx::query_as::<_, StateRecord>("SELECT * FROM estados ORDER BY tipo, nombre")
            .fetch_all(&self.pool)
            .await?;

        Ok(states)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<StateRecord> {
        sqlx::query_as::<_, StateRecord>("SELECT * FROM estados WHERE id_estado = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("State with id {} not found", id)))
    }

    pub async fn create(&self, state: &StateFields<'_>) -> AppResult<StateRecord> {
        sqlx::query_as::<_, StateRecord>(
            r#"
            INSERT INTO estados (nombre, descripcion, tipo, color)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(state.nombre)
        .bind(state.descripcion)
        .bind(state.tipo)
        .bind(state.color)
        .fetch_one(&self.pool)
        .await
        .map_constraint(DUPLICATE_STATE, STATE_IN_USE)
    }

    pub async fn update(&self, id: i32, state: &StateFields<'_>) -> AppResult<StateRecord> {
        sqlx::query_as::<_, StateRecord>(
            r#"
            UPDATE estados
            SET nombre = $2, descripcion = $3, tipo = $4, color = $5
            WHERE id_estado = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(state.nombre)
        .bind(state.descripcion)
        .bind(state.tipo)
        .bind(state.color)
        .fetch_optional(&self.pool)
        .await
        .map_constraint(DUPLICATE_STATE, STATE_IN_USE)?
        .ok_or_else(|| AppError::NotFound(format!("State with id {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM estados WHERE id_estado = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_constraint(DUPLICATE_STATE, STATE_IN_USE)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("State with id {} not found", id)));
        }

        Ok(())
    }
}
