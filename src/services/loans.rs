//! Loan management service

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::{
        loan::{CreateLoan, LoanDetails, LoanPlan, RenewLoan},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: LoansConfig,
}

/// Loan duration in days, defaulted and bounded by the configuration
fn loan_days(requested: Option<i32>, config: &LoansConfig) -> AppResult<i32> {
    let days = requested.unwrap_or(config.default_days);
    if days < 1 || days > config.max_days {
        return Err(AppError::Validation(format!(
            "dias_prestamo must be between 1 and {}",
            config.max_days
        )));
    }
    Ok(days)
}

/// Check the request shape before anything touches the database
fn plan_loan(request: &CreateLoan, config: &LoansConfig) -> AppResult<LoanPlan> {
    if request.id_reserva.is_none() && request.id_ejemplar.is_none() {
        return Err(AppError::Validation("id_reserva or id_ejemplar is required".to_string()));
    }
    let id_ejemplar = request
        .id_ejemplar
        .ok_or_else(|| AppError::Validation("id_ejemplar is required".to_string()))?;
    if request.id_reserva.is_none() && request.id_usuario.is_none() {
        return Err(AppError::Validation(
            "id_usuario is required when no reservation is given".to_string(),
        ));
    }

    Ok(LoanPlan {
        id_reserva: request.id_reserva,
        id_ejemplar,
        id_usuario: request.id_usuario,
        dias_prestamo: loan_days(request.dias_prestamo, config)?,
    })
}

impl LoansService {
    pub fn new(repository: Repository, config: LoansConfig) -> Self {
        Self { repository, config }
    }

    pub async fn list(&self) -> AppResult<Vec<LoanDetails>> {
        self.repository.loans.list().await
    }

    pub async fn list_for_user(&self, claims: &UserClaims, id_usuario: i32) -> AppResult<Vec<LoanDetails>> {
        claims.require_self_or_admin(id_usuario)?;
        self.repository.loans.list_for_user(id_usuario).await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<LoanDetails> {
        let loan = self.repository.loans.get_by_id(id).await?;
        claims.require_self_or_admin(loan.id_usuario)?;
        Ok(loan)
    }

    /// Lend a copy, fulfilling an approved reservation when given
    pub async fn create(&self, claims: &UserClaims, request: CreateLoan) -> AppResult<LoanDetails> {
        let plan = plan_loan(&request, &self.config)?;
        let id = self.repository.loans.create(&plan, claims.id).await?;
        self.repository.loans.get_by_id(id).await
    }

    pub async fn return_loan(&self, claims: &UserClaims, id: i32) -> AppResult<LoanDetails> {
        self.repository.loans.return_loan(id, claims.id).await?;
        self.repository.loans.get_by_id(id).await
    }

    /// Extend the due date of an open loan
    pub async fn renew(&self, id: i32, request: RenewLoan) -> AppResult<LoanDetails> {
        let days = loan_days(request.dias_prestamo, &self.config)?;
        self.repository
            .loans
            .renew(id, days, self.config.max_renewals)
            .await?;
        tracing::info!(id_prestamo = id, days, "Loan renewed");
        self.repository.loans.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_days_defaults_and_bounds() {
        let config = LoansConfig::default();
        assert_eq!(loan_days(None, &config).unwrap(), 14);
        assert_eq!(loan_days(Some(90), &config).unwrap(), 90);
        assert!(loan_days(Some(0), &config).is_err());
        assert!(loan_days(Some(91), &config).is_err());
    }

    #[test]
    fn test_plan_requires_a_copy() {
        let config = LoansConfig::default();
        let request = CreateLoan {
            id_reserva: Some(4),
            ..Default::default()
        };
        match plan_loan(&request, &config) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "id_ejemplar is required"),
            other => panic!("unexpected result: {other:?}"),
        }

        let empty = CreateLoan::default();
        assert!(plan_loan(&empty, &config).is_err());
    }

    #[test]
    fn test_plan_without_reservation_needs_borrower() {
        let config = LoansConfig::default();
        let request = CreateLoan {
            id_ejemplar: Some(9),
            ..Default::default()
        };
        assert!(plan_loan(&request, &config).is_err());

        let request = CreateLoan {
            id_ejemplar: Some(9),
            id_usuario: Some(2),
            dias_prestamo: Some(7),
            ..Default::default()
        };
        assert_eq!(
            plan_loan(&request, &config).unwrap(),
            LoanPlan {
                id_reserva: None,
                id_ejemplar: 9,
                id_usuario: Some(2),
                dias_prestamo: 7,
            }
        );
    }
}
