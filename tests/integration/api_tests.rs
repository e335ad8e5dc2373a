//! API integration tests against a running server
//!
//! Run with: `cargo test --test api_tests -- --ignored`
//! The server needs a bootstrap administrator; its credentials are read
//! from `TEST_ADMIN_CORREO` and `TEST_ADMIN_PASSWORD`.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn base_url() -> String {
    std::env::var("TEST_BASE_URL").unwrap_or_else(|_| "http://localhost:3000/api/v1".to_string())
}

fn admin_credentials() -> (String, String) {
    (
        std::env::var("TEST_ADMIN_CORREO").unwrap_or_else(|_| "admin@biblioteca.local".to_string()),
        std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "change-me".to_string()),
    )
}

fn unique_suffix() -> String {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default().to_string()
}

async fn login(client: &Client, correo: &str, password: &str) -> Value {
    let response = client
        .post(format!("{}/login", base_url()))
        .json(&json!({ "correo": correo, "password": password }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse login response")
}

async fn admin_token(client: &Client) -> String {
    let (correo, password) = admin_credentials();
    let body = login(client, &correo, &password).await;
    body["token"].as_str().expect("No token in response").to_string()
}

/// Create a student and return `(id, token)`
async fn new_student(client: &Client, admin: &str) -> (i64, String) {
    let suffix = unique_suffix();
    let correo = format!("lector{}@biblioteca.test", suffix);
    let response = client
        .post(format!("{}/usuarios", base_url()))
        .bearer_auth(admin)
        .json(&json!({
            "nombre_completo": "Lector de Prueba",
            "identificacion": format!("ID{}", suffix),
            "correo": correo,
            "password": "secreto1"
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), StatusCode::CREATED);
    let user: Value = response.json().await.unwrap();

    let session = login(client, &correo, "secreto1").await;
    (
        user["id_usuario"].as_i64().unwrap(),
        session["token"].as_str().unwrap().to_string(),
    )
}

/// Create a book with one copy and return `(id_libro, id_ejemplar)`
async fn new_book_with_copy(client: &Client, admin: &str) -> (i64, i64) {
    let suffix = unique_suffix();
    let book: Value = client
        .post(format!("{}/libros", base_url()))
        .bearer_auth(admin)
        .json(&json!({ "titulo": format!("Ficciones {}", suffix), "autor": "Jorge Luis Borges" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id_libro = book["id_libro"].as_i64().unwrap();

    let copy: Value = client
        .post(format!("{}/ejemplares", base_url()))
        .bearer_auth(admin)
        .json(&json!({ "id_libro": id_libro, "codigo_ejemplar": format!("EJ-{}", suffix) }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    (id_libro, copy["id_ejemplar"].as_i64().unwrap())
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = Client::new()
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let (correo, _) = admin_credentials();
    let response = Client::new()
        .post(format!("{}/login", base_url()))
        .json(&json!({ "correo": correo, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_email_is_rejected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (correo, _) = admin_credentials();

    let response = client
        .post(format!("{}/usuarios", base_url()))
        .bearer_auth(&admin)
        .json(&json!({
            "nombre_completo": "Otra Persona",
            "identificacion": format!("ID{}", unique_suffix()),
            "correo": correo,
            "password": "secreto1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_email_uniqueness_ignores_case() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let suffix = unique_suffix();

    let mut statuses = Vec::new();
    for correo in [
        format!("ana{}@biblioteca.test", suffix),
        format!("Ana{}@Biblioteca.test", suffix),
    ] {
        let response = client
            .post(format!("{}/usuarios", base_url()))
            .bearer_auth(&admin)
            .json(&json!({
                "nombre_completo": "Ana Pérez",
                "identificacion": format!("ID{}{}", suffix, statuses.len()),
                "correo": correo,
                "password": "secreto1"
            }))
            .send()
            .await
            .unwrap();
        statuses.push(response.status());
        if response.status() == StatusCode::BAD_REQUEST {
            let body: Value = response.json().await.unwrap();
            assert_eq!(body["error"], "Email is already registered");
        }
    }

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    // The surviving account logs in whatever the case used
    let session = login(&client, &format!("ANA{}@BIBLIOTECA.TEST", suffix), "secreto1").await;
    assert!(session["token"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_reservation_to_loan_to_return() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id_usuario, student) = new_student(&client, &admin).await;
    let (id_libro, id_ejemplar) = new_book_with_copy(&client, &admin).await;

    // Reserve
    let response = client
        .post(format!("{}/reservas", base_url()))
        .bearer_auth(&student)
        .json(&json!({ "id_libro": id_libro }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A second active reservation for the same book is refused
    let response = client
        .post(format!("{}/reservas", base_url()))
        .bearer_auth(&student)
        .json(&json!({ "id_libro": id_libro }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let reservations: Value = client
        .get(format!("{}/reservas/usuario/{}", base_url(), id_usuario))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id_reserva = reservations[0]["id_reserva"].as_i64().unwrap();
    assert_eq!(reservations[0]["estado"], "pendiente");

    // Approve
    let response = client
        .put(format!("{}/reservas/{}/aprobar", base_url(), id_reserva))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Lend
    let response = client
        .post(format!("{}/prestamos", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "id_reserva": id_reserva, "id_ejemplar": id_ejemplar }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let loan: Value = response.json().await.unwrap();
    let id_prestamo = loan["id_prestamo"].as_i64().unwrap();
    assert_eq!(loan["estado_nombre"], "Prestado");

    let book: Value = client
        .get(format!("{}/libros/{}", base_url(), id_libro))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["ejemplares_disponibles"], 0);

    let history: Value = client
        .get(format!("{}/historial_reservas/{}", base_url(), id_reserva))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = history.as_array().unwrap();
    assert!(entries.len() >= 3);
    let fulfilled = entries
        .iter()
        .filter(|entry| entry["estado_nuevo"] == "cumplida")
        .count();
    assert_eq!(fulfilled, 1);

    let reservation: Value = client
        .get(format!("{}/reservas/{}", base_url(), id_reserva))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reservation["estado"], "cumplida");

    // The reservation cannot be lent a second time
    let response = client
        .post(format!("{}/prestamos", base_url()))
        .bearer_auth(&admin)
        .json(&json!({ "id_reserva": id_reserva, "id_ejemplar": id_ejemplar }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let history: Value = client
        .get(format!("{}/historial_reservas/{}", base_url(), id_reserva))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), entries.len());

    // Return, then a second return is refused
    let response = client
        .put(format!("{}/prestamos/{}/devolver", base_url(), id_prestamo))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .put(format!("{}/prestamos/{}/devolver", base_url(), id_prestamo))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let book: Value = client
        .get(format!("{}/libros/{}", base_url(), id_libro))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(book["ejemplares_disponibles"], 1);
}

#[tokio::test]
#[ignore]
async fn test_student_cancels_pending_reservation() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id_usuario, student) = new_student(&client, &admin).await;
    let (id_libro, _) = new_book_with_copy(&client, &admin).await;

    client
        .post(format!("{}/reservas", base_url()))
        .bearer_auth(&student)
        .json(&json!({ "id_libro": id_libro }))
        .send()
        .await
        .unwrap();
    let reservations: Value = client
        .get(format!("{}/reservas/usuario/{}", base_url(), id_usuario))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id_reserva = reservations[0]["id_reserva"].as_i64().unwrap();

    let response = client
        .put(format!("{}/reservas/{}/cancelar", base_url(), id_reserva))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Cancelled reservations cannot be approved
    let response = client
        .put(format!("{}/reservas/{}/aprobar", base_url(), id_reserva))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_favorites_rating_bounds() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (id_usuario, student) = new_student(&client, &admin).await;
    let (id_libro, _) = new_book_with_copy(&client, &admin).await;

    let response = client
        .post(format!("{}/usuarios/{}/favoritos", base_url(), id_usuario))
        .bearer_auth(&student)
        .json(&json!({ "id_libro": id_libro, "calificacion": 6 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/usuarios/{}/favoritos", base_url(), id_usuario))
        .bearer_auth(&student)
        .json(&json!({ "id_libro": id_libro, "calificacion": 5, "resena": "Imprescindible" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let favorites: Value = client
        .get(format!("{}/usuarios/{}/favoritos", base_url(), id_usuario))
        .bearer_auth(&student)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(favorites[0]["calificacion"], 5);
}
