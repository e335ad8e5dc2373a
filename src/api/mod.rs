//! API handlers for the Biblioteca REST endpoints

pub mod auth;
pub mod books;
pub mod copies;
pub mod favorites;
pub mod health;
pub mod loans;
pub mod notifications;
pub mod openapi;
pub mod reservations;
pub mod states;
pub mod stats;
pub mod users;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{header::AUTHORIZATION, request::Parts},
    routing::{delete, get, post, put},
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = state.services.auth.verify_token(token)?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Extractor for an authenticated administrator
pub struct AdminUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require_admin()?;
        Ok(AdminUser(claims))
    }
}

/// JSON body extractor reporting malformed bodies as `AppError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Path parameter extractor reporting unparsable segments as `AppError`
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// JSON body that may be left out entirely
///
/// An empty body yields `T::default()`; anything else must parse as `T`.
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }

        serde_json::from_slice(&bytes).map(OptionalJson).map_err(|e| {
            AppError::Validation(format!("Failed to parse the request body as JSON: {e}"))
        })
    }
}

/// Plain confirmation body
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fallback for unknown API paths
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// `/api/v1` routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/login", post(auth::login))
        .route("/verificar-sesion", get(auth::verify_session))
        // Users
        .route("/usuarios", get(users::list_users).post(users::create_user))
        .route(
            "/usuarios/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        // Favorites
        .route(
            "/usuarios/:id/favoritos",
            get(favorites::list_favorites).post(favorites::upsert_favorite),
        )
        .route(
            "/usuarios/:id/favoritos/:id_libro",
            delete(favorites::delete_favorite),
        )
        // Books
        .route("/libros", get(books::list_books).post(books::create_book))
        .route(
            "/libros/:id",
            get(books::get_book).put(books::update_book).delete(books::delete_book),
        )
        .route("/libros/:id/ejemplares", get(books::list_book_copies))
        // Copies
        .route("/ejemplares", get(copies::list_copies).post(copies::create_copy))
        .route(
            "/ejemplares/:id",
            get(copies::get_copy).put(copies::update_copy).delete(copies::delete_copy),
        )
        // States
        .route("/estados", get(states::list_states).post(states::create_state))
        .route(
            "/estados/:id",
            get(states::get_state).put(states::update_state).delete(states::delete_state),
        )
        // Reservations
        .route(
            "/reservas",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route(
            "/reservas/usuario/:id_usuario",
            get(reservations::list_user_reservations),
        )
        .route(
            "/reservas/:id",
            get(reservations::get_reservation).delete(reservations::delete_reservation),
        )
        .route("/reservas/:id/aprobar", put(reservations::approve_reservation))
        .route("/reservas/:id/rechazar", put(reservations::reject_reservation))
        .route("/reservas/:id/cancelar", put(reservations::cancel_reservation))
        .route(
            "/historial_reservas/:id_reserva",
            get(reservations::reservation_history),
        )
        // Loans
        .route("/prestamos", get(loans::list_loans).post(loans::create_loan))
        .route("/prestamos/usuario/:id_usuario", get(loans::list_user_loans))
        .route("/prestamos/:id", get(loans::get_loan))
        .route("/prestamos/:id/devolver", put(loans::return_loan))
        .route("/prestamos/:id/renovar", put(loans::renew_loan))
        // Notifications
        .route("/notificaciones", post(notifications::create_notification))
        .route(
            "/notificaciones/:id_usuario",
            get(notifications::list_notifications),
        )
        .route(
            "/notificaciones/:id_usuario/:id_notificacion",
            delete(notifications::delete_notification),
        )
        .route(
            "/notificaciones/:id_usuario/:id_notificacion/leida",
            put(notifications::mark_notification_read),
        )
        // Statistics
        .route("/estadisticas/generales", get(stats::general_stats))
        .route(
            "/estadisticas/libros_mas_reservados",
            get(stats::most_reserved_books),
        )
        .fallback(not_found)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Days {
        dias: Option<i32>,
    }

    fn body(text: &'static str) -> Request {
        axum::http::Request::builder()
            .header("content-type", "application/json")
            .body(Body::from(text))
            .unwrap()
    }

    #[tokio::test]
    async fn test_optional_json_defaults_on_empty_body() {
        let OptionalJson(days) = OptionalJson::<Days>::from_request(body(""), &()).await.unwrap();
        assert_eq!(days, Days::default());

        let OptionalJson(days) = OptionalJson::<Days>::from_request(body(" \n"), &()).await.unwrap();
        assert_eq!(days, Days::default());
    }

    #[tokio::test]
    async fn test_optional_json_parses_present_body() {
        let OptionalJson(days) = OptionalJson::<Days>::from_request(body(r#"{"dias": 5}"#), &())
            .await
            .unwrap();
        assert_eq!(days.dias, Some(5));
    }

    #[tokio::test]
    async fn test_optional_json_rejects_malformed_body() {
        for text in ["{ not json", r#"{"dias": "cinco"}"#] {
            let result = OptionalJson::<Days>::from_request(body(text), &()).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{text}");
        }
    }
}
