//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, books, copies, favorites, health, loans, notifications, reservations, states, stats, users,
};

/// Registers the `bearer_auth` scheme referenced by the secured paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biblioteca API",
        version = "1.0.0",
        description = "Library management REST API: catalog, reservations and loans",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&BearerAuth),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::verify_session,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        // Favorites
        favorites::list_favorites,
        favorites::upsert_favorite,
        favorites::delete_favorite,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::list_book_copies,
        // Copies
        copies::list_copies,
        copies::get_copy,
        copies::create_copy,
        copies::update_copy,
        copies::delete_copy,
        // States
        states::list_states,
        states::get_state,
        states::create_state,
        states::update_state,
        states::delete_state,
        // Reservations
        reservations::list_reservations,
        reservations::list_user_reservations,
        reservations::get_reservation,
        reservations::create_reservation,
        reservations::approve_reservation,
        reservations::reject_reservation,
        reservations::cancel_reservation,
        reservations::delete_reservation,
        reservations::reservation_history,
        // Loans
        loans::list_loans,
        loans::list_user_loans,
        loans::get_loan,
        loans::create_loan,
        loans::return_loan,
        loans::renew_loan,
        // Notifications
        notifications::list_notifications,
        notifications::mark_notification_read,
        notifications::create_notification,
        notifications::delete_notification,
        // Stats
        stats::general_stats,
        stats::most_reserved_books,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::SessionUser,
            auth::SessionResponse,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::AccountStatus,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UserClaims,
            // Catalog
            crate::models::book::Book,
            crate::models::book::BookInput,
            crate::models::copy::BookCopy,
            crate::models::copy::PhysicalCondition,
            crate::models::copy::CreateCopy,
            crate::models::copy::UpdateCopy,
            // States
            crate::models::state::StateRecord,
            crate::models::state::StateKind,
            crate::models::state::StateInput,
            // Reservations
            crate::models::reservation::Reservation,
            crate::models::reservation::ReservationStatus,
            crate::models::reservation::ReservationHistoryEntry,
            crate::models::reservation::CreateReservation,
            crate::models::reservation::ApproveReservation,
            crate::models::reservation::RejectReservation,
            // Loans
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::RenewLoan,
            // Notifications and favorites
            crate::models::notification::Notification,
            crate::models::notification::CreateNotification,
            crate::models::favorite::Favorite,
            crate::models::favorite::UpsertFavorite,
            // Stats
            crate::models::stats::GeneralStats,
            crate::models::stats::MostReservedBook,
            // Health
            health::HealthResponse,
            // Common
            crate::api::MessageResponse,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "favorites", description = "Favorite books and reviews"),
        (name = "books", description = "Catalog titles"),
        (name = "copies", description = "Physical copies"),
        (name = "states", description = "Loan and reservation states"),
        (name = "reservations", description = "Reservation workflow"),
        (name = "loans", description = "Loan management"),
        (name = "notifications", description = "User notifications"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
