//! Browser session carried in the `token` cookie

use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{models::user::UserClaims, AppState};

pub const SESSION_COOKIE: &str = "token";

/// Claims of the signed-in user, if the cookie holds a valid token.
///
/// Missing, malformed and expired tokens all read as no session.
pub struct Session(pub Option<UserClaims>);

#[async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let claims = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.services.auth.verify_token(cookie.value()).ok());

        Ok(Session(claims))
    }
}

pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie matching the session cookie's name and path, for `CookieJar::remove`
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
