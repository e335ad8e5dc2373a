//! Loan management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails, RenewLoan},
};

use super::{AdminUser, ApiJson, ApiPath, AuthenticatedUser, OptionalJson};

/// List all loans
#[utoipa::path(
    get,
    path = "/prestamos",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "All loans", body = Vec<LoanDetails>))
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list().await?;
    Ok(Json(loans))
}

/// Get loans for a specific user
#[utoipa::path(
    get,
    path = "/prestamos/usuario/{id_usuario}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id_usuario" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's loans, open first", body = Vec<LoanDetails>),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_user_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id_usuario): ApiPath<i32>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.list_for_user(&claims, id_usuario).await?;
    Ok(Json(loans))
}

#[utoipa::path(
    get,
    path = "/prestamos/{id}",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan details", body = LoanDetails),
        (status = 403, description = "Access denied", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.get(&claims, id).await?;
    Ok(Json(loan))
}

/// Create a new loan, optionally fulfilling an approved reservation
#[utoipa::path(
    post,
    path = "/prestamos",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoan,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Invalid request or loan rule violated", body = crate::error::ErrorResponse),
        (status = 404, description = "Reservation, copy or user not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(request): ApiJson<CreateLoan>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state.services.loans.create(&admin, request).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed copy
#[utoipa::path(
    put,
    path = "/prestamos/{id}/devolver",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Copy returned", body = LoanDetails),
        (status = 400, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.return_loan(&admin, id).await?;
    Ok(Json(loan))
}

/// Renew a loan
#[utoipa::path(
    put,
    path = "/prestamos/{id}/renovar",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Loan ID")),
    request_body = RenewLoan,
    responses(
        (status = 200, description = "Loan renewed", body = LoanDetails),
        (status = 400, description = "Returned loan or renewal limit reached", body = crate::error::ErrorResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    AdminUser(_admin): AdminUser,
    ApiPath(id): ApiPath<i32>,
    OptionalJson(request): OptionalJson<RenewLoan>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.renew(id, request).await?;
    Ok(Json(loan))
}
