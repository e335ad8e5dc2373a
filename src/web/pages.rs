//! Page rendering and form actions for the browser frontend

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookInput, BookQuery},
        favorite::UpsertFavorite,
        loan::CreateLoan,
        non_empty,
        reservation::{ApproveReservation, CreateReservation, RejectReservation},
        user::{CreateUser, Role, UserClaims},
    },
    AppState,
};

use super::{
    routes::{resolve, Page, Resolution, ADMIN_PATH, CUSTOMER_PATH, LOGIN_PATH},
    session::{removal_cookie, session_cookie, Session},
    views::{self, AdminView, CustomerView, Flash},
};

/// Renders any page path, applying the route guards
pub async fn page(
    State(state): State<AppState>,
    Session(session): Session,
    uri: Uri,
    Query(flash): Query<Flash>,
) -> Response {
    let page = match resolve(uri.path(), session.as_ref()) {
        Resolution::Redirect(to) => return Redirect::to(to).into_response(),
        Resolution::Render(page) => page,
    };

    match render(&state, page, session.as_ref(), &flash).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(path = %uri.path(), error = %err, "Page failed to load");
            (
                err.status(),
                Html(views::layout(
                    "Error",
                    session.as_ref(),
                    &Flash::default(),
                    &views::failure(&err.public_message()),
                )),
            )
                .into_response()
        }
    }
}

async fn render(
    state: &AppState,
    page: Page,
    session: Option<&UserClaims>,
    flash: &Flash,
) -> AppResult<Response> {
    let services = &state.services;
    let search = || BookQuery {
        q: flash.q.clone(),
        genero: None,
    };

    let (status, title, body) = match (page, session) {
        (Page::Home, _) => {
            let books = services.catalog.search_books(search()).await?;
            (StatusCode::OK, "Catalog", views::home(&books, flash.q.as_deref()))
        }
        (Page::Login, _) => (StatusCode::OK, "Log in", views::login()),
        (Page::Register, _) => (StatusCode::OK, "Register", views::register(session)),
        (Page::Customer, Some(claims)) => {
            let view = CustomerView {
                catalog: services.catalog.search_books(search()).await?,
                reservations: services.reservations.list_for_user(claims, claims.id).await?,
                loans: services.loans.list_for_user(claims, claims.id).await?,
                favorites: services.favorites.list(claims, claims.id).await?,
                notifications: services.notifications.list_for_user(claims, claims.id).await?,
            };
            (
                StatusCode::OK,
                "My library",
                views::customer(&view, flash.q.as_deref()),
            )
        }
        (Page::Admin, Some(_)) => {
            let view = AdminView {
                stats: services.stats.general().await?,
                most_reserved: services.stats.most_reserved().await?,
                books: services.catalog.search_books(BookQuery::default()).await?,
                reservations: services.reservations.list().await?,
                loans: services.loans.list().await?,
                users: services.users.list().await?,
            };
            (StatusCode::OK, "Administration", views::admin(&view))
        }
        (Page::Customer | Page::Admin, None) => {
            return Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        (Page::NotFound, _) => (StatusCode::NOT_FOUND, "Page not found", views::not_found()),
    };

    Ok((status, Html(views::layout(title, session, flash, &body))).into_response())
}

/// Redirect to `path` carrying a flash message
fn flash_redirect(path: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?{}={}", path, key, urlencoding::encode(message)))
}

/// Report the outcome of a form action back on the page it came from
fn outcome<T>(path: &str, result: AppResult<T>, done: &str) -> Redirect {
    match result {
        Ok(_) => flash_redirect(path, "aviso", done),
        Err(err) => {
            tracing::debug!(error = %err, "Form action rejected");
            flash_redirect(path, "error", &err.public_message())
        }
    }
}

fn signed_in(session: Option<UserClaims>) -> Result<UserClaims, Redirect> {
    session.ok_or_else(|| Redirect::to(LOGIN_PATH))
}

fn admin_session(session: Option<UserClaims>) -> Result<UserClaims, Redirect> {
    let claims = signed_in(session)?;
    match claims.require_admin() {
        Ok(()) => Ok(claims),
        Err(err) => Err(flash_redirect(CUSTOMER_PATH, "error", &err.public_message())),
    }
}

/// Parse an optional numeric form field
fn parse_number<T: std::str::FromStr>(field: &str, value: Option<String>) -> AppResult<Option<T>> {
    non_empty(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| AppError::Validation(format!("{} must be a number", field)))
        })
        .transpose()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub correo: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let (Some(correo), Some(password)) = (non_empty(form.correo), form.password.filter(|p| !p.is_empty()))
    else {
        return flash_redirect(LOGIN_PATH, "error", "correo and password are required").into_response();
    };

    match state.services.auth.login(&correo, &password).await {
        Ok((token, user)) => {
            let target = if user.role == Role::Admin {
                ADMIN_PATH
            } else {
                CUSTOMER_PATH
            };
            (jar.add(session_cookie(token)), Redirect::to(target)).into_response()
        }
        Err(err) => flash_redirect(LOGIN_PATH, "error", &err.public_message()).into_response(),
    }
}

pub async fn logout(jar: CookieJar) -> Response {
    (
        jar.remove(removal_cookie()),
        flash_redirect(LOGIN_PATH, "aviso", "Session closed"),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub nombre_completo: Option<String>,
    pub identificacion: Option<String>,
    pub correo: Option<String>,
    pub password: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub role: Option<String>,
}

/// Account creation from the register page, administrators only
pub async fn register(
    State(state): State<AppState>,
    Session(session): Session,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, Redirect> {
    admin_session(session)?;

    let result = async {
        let role = non_empty(form.role)
            .map(|raw| raw.parse::<Role>().map_err(AppError::Validation))
            .transpose()?;
        let request = CreateUser {
            nombre_completo: form.nombre_completo,
            password: form.password,
            identificacion: form.identificacion,
            correo: form.correo,
            telefono: form.telefono,
            direccion: form.direccion,
            role,
            estado_cuenta: None,
        };
        state.services.users.create(request).await
    }
    .await;

    Ok(match result {
        Ok(user) => flash_redirect(
            ADMIN_PATH,
            "aviso",
            &format!("Account created for {}", user.correo),
        ),
        Err(err) => flash_redirect("/register", "error", &err.public_message()),
    })
}

#[derive(Debug, Deserialize)]
pub struct ReserveForm {
    pub id_libro: Option<String>,
    pub observaciones_usuario: Option<String>,
}

pub async fn reserve(
    State(state): State<AppState>,
    Session(session): Session,
    Form(form): Form<ReserveForm>,
) -> Result<Redirect, Redirect> {
    let claims = signed_in(session)?;
    let result = async {
        let request = CreateReservation {
            id_libro: parse_number("id_libro", form.id_libro)?,
            observaciones_usuario: form.observaciones_usuario,
        };
        state.services.reservations.create(&claims, request).await
    }
    .await;
    Ok(outcome(CUSTOMER_PATH, result, "Reservation requested"))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = signed_in(session)?;
    let result = state.services.reservations.cancel(&claims, id).await;
    Ok(outcome(CUSTOMER_PATH, result, "Reservation cancelled"))
}

#[derive(Debug, Deserialize)]
pub struct FavoriteForm {
    pub id_libro: Option<String>,
    pub calificacion: Option<String>,
    pub resena: Option<String>,
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Session(session): Session,
    Form(form): Form<FavoriteForm>,
) -> Result<Redirect, Redirect> {
    let claims = signed_in(session)?;
    let result = async {
        let request = UpsertFavorite {
            id_libro: parse_number("id_libro", form.id_libro)?,
            calificacion: parse_number("calificacion", form.calificacion)?,
            resena: form.resena,
        };
        state.services.favorites.upsert(&claims, claims.id, request).await
    }
    .await;
    Ok(outcome(CUSTOMER_PATH, result, "Saved to favorites"))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id_libro): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = signed_in(session)?;
    let result = state
        .services
        .favorites
        .remove(&claims, claims.id, id_libro)
        .await;
    Ok(outcome(CUSTOMER_PATH, result, "Removed from favorites"))
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = signed_in(session)?;
    let result = state
        .services
        .notifications
        .mark_read(&claims, claims.id, id)
        .await;
    Ok(outcome(CUSTOMER_PATH, result, "Notification marked as read"))
}

#[derive(Debug, Deserialize)]
pub struct BookForm {
    pub titulo: Option<String>,
    pub autor: Option<String>,
    pub isbn: Option<String>,
    pub genero: Option<String>,
    pub editorial: Option<String>,
    pub anio_publicacion: Option<String>,
}

pub async fn create_book(
    State(state): State<AppState>,
    Session(session): Session,
    Form(form): Form<BookForm>,
) -> Result<Redirect, Redirect> {
    admin_session(session)?;
    let result = async {
        let input = BookInput {
            titulo: form.titulo,
            autor: form.autor,
            isbn: form.isbn,
            genero: form.genero,
            editorial: form.editorial,
            anio_publicacion: parse_number("anio_publicacion", form.anio_publicacion)?,
            ..Default::default()
        };
        state.services.catalog.create_book(input).await
    }
    .await;
    Ok(outcome(ADMIN_PATH, result, "Book added"))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    admin_session(session)?;
    let result = state.services.catalog.delete_book(id).await;
    Ok(outcome(ADMIN_PATH, result, "Book deleted"))
}

pub async fn approve_reservation(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = admin_session(session)?;
    let result = state
        .services
        .reservations
        .approve(&claims, id, ApproveReservation::default())
        .await;
    Ok(outcome(ADMIN_PATH, result, "Reservation approved"))
}

#[derive(Debug, Deserialize)]
pub struct RejectForm {
    pub motivo: Option<String>,
}

pub async fn reject_reservation(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
    Form(form): Form<RejectForm>,
) -> Result<Redirect, Redirect> {
    let claims = admin_session(session)?;
    let request = RejectReservation { motivo: form.motivo };
    let result = state.services.reservations.reject(&claims, id, request).await;
    Ok(outcome(ADMIN_PATH, result, "Reservation rejected"))
}

#[derive(Debug, Deserialize)]
pub struct LoanForm {
    pub id_reserva: Option<String>,
    pub id_ejemplar: Option<String>,
    pub id_usuario: Option<String>,
    pub dias_prestamo: Option<String>,
}

pub async fn create_loan(
    State(state): State<AppState>,
    Session(session): Session,
    Form(form): Form<LoanForm>,
) -> Result<Redirect, Redirect> {
    let claims = admin_session(session)?;
    let result = async {
        let request = CreateLoan {
            id_reserva: parse_number("id_reserva", form.id_reserva)?,
            id_ejemplar: parse_number("id_ejemplar", form.id_ejemplar)?,
            id_usuario: parse_number("id_usuario", form.id_usuario)?,
            dias_prestamo: parse_number("dias_prestamo", form.dias_prestamo)?,
        };
        state.services.loans.create(&claims, request).await
    }
    .await;
    Ok(outcome(ADMIN_PATH, result, "Loan registered"))
}

pub async fn return_loan(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = admin_session(session)?;
    let result = state.services.loans.return_loan(&claims, id).await;
    Ok(outcome(ADMIN_PATH, result, "Loan returned"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Session(session): Session,
    Path(id): Path<i32>,
) -> Result<Redirect, Redirect> {
    let claims = admin_session(session)?;
    if claims.id == id {
        return Ok(flash_redirect(
            ADMIN_PATH,
            "error",
            "You cannot delete your own account",
        ));
    }
    let result = state.services.users.delete(id).await;
    Ok(outcome(ADMIN_PATH, result, "User deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<i32>("id_libro", None).unwrap(), None);
        assert_eq!(parse_number::<i32>("id_libro", Some("  ".into())).unwrap(), None);
        assert_eq!(parse_number::<i32>("id_libro", Some(" 12 ".into())).unwrap(), Some(12));
        match parse_number::<i16>("calificacion", Some("five".into())) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "calificacion must be a number"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_outcome_encodes_message() {
        let response = outcome(CUSTOMER_PATH, AppResult::Ok(()), "Saved to favorites").into_response();
        assert_eq!(
            response.headers()["location"],
            "/customerviews?aviso=Saved%20to%20favorites"
        );

        let failed: AppResult<()> = Err(AppError::Internal("pool exhausted".into()));
        let response = outcome(ADMIN_PATH, failed, "unused").into_response();
        assert_eq!(
            response.headers()["location"],
            "/adminviews?error=Internal%20server%20error"
        );
    }
}
