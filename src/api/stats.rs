//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::stats::{GeneralStats, MostReservedBook},
};

use super::AdminUser;

#[utoipa::path(
    get,
    path = "/estadisticas/generales",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Library totals", body = GeneralStats))
)]
pub async fn general_stats(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<GeneralStats>> {
    let stats = state.services.stats.general().await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get,
    path = "/estadisticas/libros_mas_reservados",
    tag = "stats",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Top 10 most reserved books", body = Vec<MostReservedBook>))
)]
pub async fn most_reserved_books(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<MostReservedBook>>> {
    let books = state.services.stats.most_reserved().await?;
    Ok(Json(books))
}
