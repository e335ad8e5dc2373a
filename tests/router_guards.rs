//! Router-level tests for guards that reject before the database is touched

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use biblioteca_server::{
    build_router,
    config::AppConfig,
    models::user::{Role, UserClaims},
    repository::Repository,
    services::Services,
    AppState,
};

fn app() -> Router {
    let config = AppConfig::default();
    // Never connects: every request below is answered before a query runs
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let services = Services::new(Repository::new(pool), &config);

    build_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn token(id: i32, role: Role) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = UserClaims {
        sub: format!("user{id}@biblioteca.test"),
        id,
        correo: format!("user{id}@biblioteca.test"),
        role,
        exp: now + 3600,
        iat: now,
    };
    claims
        .create_token(&AppConfig::default().auth.jwt_secret)
        .expect("token")
}

fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

fn page_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(header::COOKIE, format!("token={token}"));
    }
    builder.body(Body::empty()).expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

fn location(response: &axum::response::Response) -> &str {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("location header")
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let response = app()
        .oneshot(request(Method::GET, "/api/v1/reservas", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let response = app()
        .oneshot(request(
            Method::GET,
            "/api/v1/verificar-sesion",
            Some("not-a-jwt"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_session_returns_claims() {
    let token = token(7, Role::Estudiante);
    let response = app()
        .oneshot(request(Method::GET, "/api/v1/verificar-sesion", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["user"]["id"], 7);
    assert_eq!(body["user"]["role"], "estudiante");
}

#[tokio::test]
async fn test_students_cannot_use_admin_routes() {
    let token = token(7, Role::Estudiante);
    for (method, uri) in [
        (Method::GET, "/api/v1/usuarios"),
        (Method::GET, "/api/v1/prestamos"),
        (Method::PUT, "/api/v1/reservas/1/aprobar"),
        (Method::DELETE, "/api/v1/libros/1"),
        (Method::GET, "/api/v1/estadisticas/generales"),
    ] {
        let response = app()
            .oneshot(request(method.clone(), uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_students_cannot_read_other_users_records() {
    let token = token(7, Role::Estudiante);
    for uri in [
        "/api/v1/reservas/usuario/8",
        "/api/v1/prestamos/usuario/8",
        "/api/v1/usuarios/8/favoritos",
        "/api/v1/notificaciones/8",
    ] {
        let response = app()
            .oneshot(request(Method::GET, uri, Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn test_missing_fields_are_bad_requests() {
    let student = token(7, Role::Estudiante);
    let response = app()
        .oneshot(request(Method::POST, "/api/v1/reservas", Some(&student), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "id_libro is required");

    let admin = token(1, Role::Admin);
    let response = app()
        .oneshot(request(Method::POST, "/api/v1/prestamos", Some(&admin), Some(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app()
        .oneshot(request(
            Method::PUT,
            "/api/v1/reservas/3/rechazar",
            Some(&admin),
            Some(json!({ "motivo": "  " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "motivo is required");
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let response = app()
        .oneshot(request(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "correo": "lector@biblioteca.test" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let admin = token(1, Role::Admin);
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/libros")
                .header(header::AUTHORIZATION, format!("Bearer {admin}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparsable_path_ids_are_json_bad_requests() {
    let student = token(1, Role::Estudiante);
    for (method, uri) in [
        (Method::PUT, "/api/v1/reservas/x/cancelar"),
        (Method::DELETE, "/api/v1/usuarios/1/favoritos/zz"),
        (Method::GET, "/api/v1/libros/abc"),
    ] {
        let response = app()
            .oneshot(request(method.clone(), uri, Some(&student), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json",
            "{method} {uri}"
        );
        assert!(json_body(response).await["error"].is_string(), "{method} {uri}");
    }
}

#[tokio::test]
async fn test_malformed_optional_body_is_rejected() {
    let admin = token(1, Role::Admin);
    for uri in ["/api/v1/prestamos/1/renovar", "/api/v1/reservas/1/aprobar"] {
        let response = app()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(uri)
                    .header(header::AUTHORIZATION, format!("Bearer {admin}"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{ not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    let response = app()
        .oneshot(request(
            Method::PUT,
            "/api/v1/prestamos/1/renovar",
            Some(&admin),
            Some(json!({ "dias_prestamo": "siete" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_api_route_is_json_not_found() {
    let response = app()
        .oneshot(request(Method::GET, "/api/v1/no-such-thing", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "Route not found");
}

#[tokio::test]
async fn test_private_pages_redirect_to_login() {
    for uri in ["/customerviews", "/adminviews"] {
        let response = app().oneshot(page_request(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_student_is_kept_out_of_admin_pages() {
    let token = token(7, Role::Estudiante);
    let response = app()
        .oneshot(page_request("/adminviews", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/notFound");
}

#[tokio::test]
async fn test_login_page_sends_signed_in_users_to_their_dashboard() {
    let admin = token(1, Role::Admin);
    let response = app()
        .oneshot(page_request("/login", Some(&admin)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/adminviews");

    let student = token(7, Role::Estudiante);
    let response = app()
        .oneshot(page_request("/login", Some(&student)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/customerviews");
}

#[tokio::test]
async fn test_unknown_page_renders_not_found() {
    let response = app()
        .oneshot(page_request("/no/such/page", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Page not found"));
}

#[tokio::test]
async fn test_form_actions_require_a_session() {
    let response = app()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/customerviews/reservar")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("id_libro=3"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}
