//! Loan (préstamo) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan joined with user, copy, book and state names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id_prestamo: i32,
    pub id_usuario: i32,
    pub id_ejemplar: i32,
    pub id_reserva: Option<i32>,
    pub id_estado: i32,
    pub fecha_prestamo: NaiveDate,
    pub fecha_devolucion_esperada: NaiveDate,
    pub fecha_devolucion_real: Option<NaiveDate>,
    pub renovaciones: i32,
    pub admin_registro: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub nombre_usuario: String,
    pub codigo_ejemplar: String,
    pub id_libro: i32,
    pub titulo_libro: String,
    pub estado_nombre: String,
}

impl LoanDetails {
    /// Open loan past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.fecha_devolucion_real.is_none() && self.fecha_devolucion_esperada < today
    }
}

/// Create loan request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateLoan {
    /// Approved reservation to fulfill
    pub id_reserva: Option<i32>,
    pub id_ejemplar: Option<i32>,
    /// Borrower, required when no reservation is given
    pub id_usuario: Option<i32>,
    pub dias_prestamo: Option<i32>,
}

/// Renew loan request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RenewLoan {
    pub dias_prestamo: Option<i32>,
}

/// Validated loan request.
///
/// When a reservation is given the borrower is taken from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanPlan {
    pub id_reserva: Option<i32>,
    pub id_ejemplar: i32,
    pub id_usuario: Option<i32>,
    pub dias_prestamo: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(due: NaiveDate, returned: Option<NaiveDate>) -> LoanDetails {
        LoanDetails {
            id_prestamo: 1,
            id_usuario: 2,
            id_ejemplar: 3,
            id_reserva: None,
            id_estado: 1,
            fecha_prestamo: due - chrono::Duration::days(14),
            fecha_devolucion_esperada: due,
            fecha_devolucion_real: returned,
            renovaciones: 0,
            admin_registro: Some(1),
            created_at: Utc::now(),
            nombre_usuario: "Ana".into(),
            codigo_ejemplar: "EJ-001".into(),
            id_libro: 4,
            titulo_libro: "Rayuela".into(),
            estado_nombre: "Prestado".into(),
        }
    }

    #[test]
    fn test_overdue_only_when_open_and_past_due() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        assert!(loan(due, None).is_overdue(after));
        assert!(!loan(due, None).is_overdue(due));
        assert!(!loan(due, Some(after)).is_overdue(after));
    }
}
