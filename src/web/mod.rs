//! Server-rendered browser frontend
//!
//! Pages share the JSON API's services; the session lives in a cookie
//! holding the same JWT the API accepts as a bearer token.

pub mod pages;
pub mod routes;
pub mod session;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

/// Page and form routes; every other path renders through the route table
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(pages::page).post(pages::login))
        .route("/logout", post(pages::logout))
        .route("/register", get(pages::page).post(pages::register))
        // Customer actions
        .route("/customerviews/reservar", post(pages::reserve))
        .route(
            "/customerviews/reservas/:id/cancelar",
            post(pages::cancel_reservation),
        )
        .route("/customerviews/favoritos", post(pages::add_favorite))
        .route(
            "/customerviews/favoritos/:id/eliminar",
            post(pages::remove_favorite),
        )
        .route(
            "/customerviews/notificaciones/:id/leida",
            post(pages::mark_notification_read),
        )
        // Admin actions
        .route("/adminviews/libros", post(pages::create_book))
        .route("/adminviews/libros/:id/eliminar", post(pages::delete_book))
        .route(
            "/adminviews/reservas/:id/aprobar",
            post(pages::approve_reservation),
        )
        .route(
            "/adminviews/reservas/:id/rechazar",
            post(pages::reject_reservation),
        )
        .route("/adminviews/prestamos", post(pages::create_loan))
        .route(
            "/adminviews/prestamos/:id/devolver",
            post(pages::return_loan),
        )
        .route(
            "/adminviews/usuarios/:id/eliminar",
            post(pages::delete_user),
        )
        .fallback(pages::page)
}
