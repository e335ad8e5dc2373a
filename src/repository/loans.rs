//! Loans (préstamos) repository.
//!
//! Loan creation and return touch the loan, the copy, the book counters and
//! possibly a reservation. Each runs in one transaction with the copy row
//! locked, so concurrent requests cannot lend the same copy twice or move a
//! counter more than once.

use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::{
        loan::{LoanDetails, LoanPlan},
        reservation::ReservationStatus,
        state::{StateKind, LOANED_STATE, RETURNED_STATE},
        user::AccountStatus,
    },
    repository::{reservations, states},
};

const LOAN_SELECT: &str = r#"
    SELECT p.id_prestamo, p.id_usuario, p.id_ejemplar, p.id_reserva, p.id_estado,
           p.fecha_prestamo, p.fecha_devolucion_esperada, p.fecha_devolucion_real,
           p.renovaciones, p.admin_registro, p.created_at,
           u.nombre_completo AS nombre_usuario,
           e.codigo_ejemplar, e.id_libro,
           l.titulo AS titulo_libro,
           s.nombre AS estado_nombre
    FROM prestamos p
    JOIN usuarios u ON u.id_usuario = p.id_usuario
    JOIN ejemplares e ON e.id_ejemplar = p.id_ejemplar
    JOIN libros l ON l.id_libro = e.id_libro
    JOIN estados s ON s.id_estado = p.id_estado
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            "{} ORDER BY p.fecha_prestamo DESC, p.id_prestamo DESC",
            LOAN_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Loans of a user, open ones first
    pub async fn list_for_user(&self, id_usuario: i32) -> AppResult<Vec<LoanDetails>> {
        let loans = sqlx::query_as::<_, LoanDetails>(&format!(
            r#"{} WHERE p.id_usuario = $1
            ORDER BY (p.fecha_devolucion_real IS NULL) DESC, p.fecha_prestamo DESC"#,
            LOAN_SELECT
        ))
        .bind(id_usuario)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(&format!("{} WHERE p.id_prestamo = $1", LOAN_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Lend a copy, fulfilling the reservation when one is given
    pub async fn create(&self, plan: &LoanPlan, id_admin: i32) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let reservation = match plan.id_reserva {
            Some(id_reserva) => {
                let reservation = reservations::lock_ref(&mut *tx, id_reserva).await?;
                if !reservation.estado.can_fulfill() {
                    return Err(AppError::BusinessRule(format!(
                        "Reservation must be approved to be lent (current: {})",
                        reservation.estado
                    )));
                }
                if plan.id_usuario.is_some_and(|id| id != reservation.id_usuario) {
                    return Err(AppError::Validation(
                        "id_usuario does not match the reservation".to_string(),
                    ));
                }
                Some(reservation)
            }
            None => None,
        };

        let id_usuario = match (&reservation, plan.id_usuario) {
            (Some(r), _) => r.id_usuario,
            (None, Some(id)) => id,
            (None, None) => {
                return Err(AppError::Validation(
                    "id_usuario is required when no reservation is given".to_string(),
                ))
            }
        };

        let copy = sqlx::query("SELECT id_libro, disponible FROM ejemplares WHERE id_ejemplar = $1 FOR UPDATE")
            .bind(plan.id_ejemplar)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Copy with id {} not found", plan.id_ejemplar)))?;
        let id_libro: i32 = copy.get("id_libro");
        let disponible: bool = copy.get("disponible");

        if let Some(r) = &reservation {
            if r.id_libro != id_libro {
                return Err(AppError::BusinessRule(
                    "Copy does not belong to the reserved book".to_string(),
                ));
            }
        }
        if !disponible {
            return Err(AppError::BusinessRule("Copy is not available".to_string()));
        }

        let borrower = sqlx::query("SELECT estado_cuenta, max_prestamos FROM usuarios WHERE id_usuario = $1")
            .bind(id_usuario)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id_usuario)))?;
        let estado_cuenta: AccountStatus = borrower.get("estado_cuenta");
        let max_prestamos: i32 = borrower.get("max_prestamos");

        if estado_cuenta != AccountStatus::Activo {
            return Err(AppError::BusinessRule(format!("User account is {}", estado_cuenta)));
        }

        let open_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM prestamos WHERE id_usuario = $1 AND fecha_devolucion_real IS NULL",
        )
        .bind(id_usuario)
        .fetch_one(&mut *tx)
        .await?;

        if open_loans >= i64::from(max_prestamos) {
            return Err(AppError::BusinessRule(format!(
                "Loan limit reached ({} active loans)",
                open_loans
            )));
        }

        let id_estado = states::find_id(&mut *tx, LOANED_STATE, StateKind::Prestamo)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Loan state '{}' is missing", LOANED_STATE)))?;

        let id_prestamo: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO prestamos
                (id_usuario, id_ejemplar, id_reserva, id_estado, fecha_devolucion_esperada, admin_registro)
            VALUES ($1, $2, $3, $4, CURRENT_DATE + $5::int, $6)
            RETURNING id_prestamo
            "#,
        )
        .bind(id_usuario)
        .bind(plan.id_ejemplar)
        .bind(plan.id_reserva)
        .bind(id_estado)
        .bind(plan.dias_prestamo)
        .bind(id_admin)
        .fetch_one(&mut *tx)
        .await
        .map_constraint("Copy is already on loan", "Loan references a missing record")?;

        sqlx::query("UPDATE ejemplares SET disponible = FALSE WHERE id_ejemplar = $1")
            .bind(plan.id_ejemplar)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE libros SET ejemplares_disponibles = ejemplares_disponibles - 1 WHERE id_libro = $1")
            .bind(id_libro)
            .execute(&mut *tx)
            .await
            .map_constraint("Book counter conflict", "Book counter conflict")?;

        if let Some(r) = &reservation {
            let fulfilled = sqlx::query("UPDATE reservas SET estado = $2 WHERE id_reserva = $1 AND estado = $3")
                .bind(r.id_reserva)
                .bind(ReservationStatus::Cumplida)
                .bind(ReservationStatus::Aprobada)
                .execute(&mut *tx)
                .await?;

            if fulfilled.rows_affected() != 1 {
                return Err(AppError::BusinessRule("Reservation was already fulfilled".to_string()));
            }

            let comentario = format!("Fulfilled by loan {}", id_prestamo);
            reservations::record_history(
                &mut *tx,
                r.id_reserva,
                Some(ReservationStatus::Aprobada),
                ReservationStatus::Cumplida,
                id_admin,
                Some(&comentario),
            )
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            id_prestamo,
            id_usuario,
            id_ejemplar = plan.id_ejemplar,
            id_reserva = ?plan.id_reserva,
            "Loan created"
        );

        Ok(id_prestamo)
    }

    /// Close an open loan and put the copy back on the shelf
    pub async fn return_loan(&self, id: i32, id_admin: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let id_estado = states::find_id(&mut *tx, RETURNED_STATE, StateKind::Prestamo)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Loan state '{}' is missing", RETURNED_STATE)))?;

        let id_ejemplar: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE prestamos
            SET fecha_devolucion_real = CURRENT_DATE, id_estado = $2, admin_registro = $3
            WHERE id_prestamo = $1 AND fecha_devolucion_real IS NULL
            RETURNING id_ejemplar
            "#,
        )
        .bind(id)
        .bind(id_estado)
        .bind(id_admin)
        .fetch_optional(&mut *tx)
        .await?;

        let id_ejemplar = match id_ejemplar {
            Some(id_ejemplar) => id_ejemplar,
            None => {
                let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM prestamos WHERE id_prestamo = $1)")
                    .bind(id)
                    .fetch_one(&mut *tx)
                    .await?;
                return Err(if exists {
                    AppError::BusinessRule("Loan was already returned".to_string())
                } else {
                    AppError::NotFound(format!("Loan with id {} not found", id))
                });
            }
        };

        let id_libro: i32 = sqlx::query_scalar(
            "UPDATE ejemplares SET disponible = TRUE WHERE id_ejemplar = $1 RETURNING id_libro",
        )
        .bind(id_ejemplar)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE libros SET ejemplares_disponibles = ejemplares_disponibles + 1 WHERE id_libro = $1")
            .bind(id_libro)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(id_prestamo = id, id_ejemplar, "Loan returned");
        Ok(())
    }

    /// Extend an open loan from its current due date
    pub async fn renew(&self, id: i32, dias: i32, max_renewals: i32) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE prestamos
            SET fecha_devolucion_esperada = fecha_devolucion_esperada + $2::int,
                renovaciones = renovaciones + 1
            WHERE id_prestamo = $1
              AND fecha_devolucion_real IS NULL
              AND renovaciones < $3
            "#,
        )
        .bind(id)
        .bind(dias)
        .bind(max_renewals)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        let loan = self.get_by_id(id).await?;
        if loan.fecha_devolucion_real.is_some() {
            Err(AppError::BusinessRule("Loan was already returned".to_string()))
        } else {
            Err(AppError::BusinessRule(format!(
                "Maximum number of renewals reached ({})",
                max_renewals
            )))
        }
    }
}
