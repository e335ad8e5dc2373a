//! Statistics rows read from the reporting views

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Single row of `v_estadisticas_generales`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GeneralStats {
    pub total_libros: i64,
    pub total_ejemplares: i64,
    pub ejemplares_disponibles: i64,
    pub total_usuarios: i64,
    pub usuarios_activos: i64,
    pub prestamos_activos: i64,
    pub prestamos_vencidos: i64,
    pub reservas_pendientes: i64,
    pub reservas_aprobadas: i64,
}

/// Row of `v_libros_mas_reservados`
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MostReservedBook {
    pub id_libro: i32,
    pub titulo: String,
    pub autor: String,
    pub isbn: Option<String>,
    pub genero: Option<String>,
    pub total_reservas: i64,
    pub reservas_pendientes: i64,
}
