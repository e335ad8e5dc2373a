//! HTML templates for the browser frontend.
//!
//! Every value interpolated into markup goes through [`escape`].

use chrono::Utc;
use serde::Deserialize;

use crate::models::{
    favorite::Favorite,
    notification::Notification,
    stats::{GeneralStats, MostReservedBook},
    user::{User, UserClaims},
    Book, LoanDetails, Reservation,
};

use super::routes::{dashboard_for, CUSTOMER_PATH};

/// Flash messages passed back to a page after a form action
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub aviso: Option<String>,
    pub error: Option<String>,
    /// Catalog search text
    pub q: Option<String>,
}

/// Data shown on the customer dashboard
pub struct CustomerView {
    pub catalog: Vec<Book>,
    pub reservations: Vec<Reservation>,
    pub loans: Vec<LoanDetails>,
    pub favorites: Vec<Favorite>,
    pub notifications: Vec<Notification>,
}

/// Data shown on the admin dashboard
pub struct AdminView {
    pub stats: GeneralStats,
    pub most_reserved: Vec<MostReservedBook>,
    pub books: Vec<Book>,
    pub reservations: Vec<Reservation>,
    pub loans: Vec<LoanDetails>,
    pub users: Vec<User>,
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn opt(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "-".to_string())
}

/// Page shell with navigation and flash messages
pub fn layout(title: &str, session: Option<&UserClaims>, flash: &Flash, body: &str) -> String {
    let nav = match session {
        Some(claims) => format!(
            r#"<a href="/home">Catalog</a> <a href="{}">My dashboard</a>
            <span class="who">{}</span>
            <form method="post" action="/logout" class="inline"><button type="submit">Log out</button></form>"#,
            dashboard_for(claims),
            escape(&claims.correo)
        ),
        None => r#"<a href="/home">Catalog</a> <a href="/login">Log in</a>"#.to_string(),
    };

    let mut messages = String::new();
    if let Some(aviso) = &flash.aviso {
        messages.push_str(&format!(r#"<p class="flash ok">{}</p>"#, escape(aviso)));
    }
    if let Some(error) = &flash.error {
        messages.push_str(&format!(r#"<p class="flash error">{}</p>"#, escape(error)));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Biblioteca</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0 auto; max-width: 72rem; padding: 1rem; }}
nav {{ display: flex; gap: 1rem; align-items: center; border-bottom: 1px solid #ccc; padding-bottom: .5rem; }}
table {{ border-collapse: collapse; width: 100%; margin: .5rem 0 1.5rem; }}
th, td {{ border-bottom: 1px solid #ddd; padding: .3rem; text-align: left; }}
.flash.ok {{ background: #e8f5e9; padding: .5rem; }}
.flash.error {{ background: #ffebee; padding: .5rem; }}
.inline {{ display: inline; }}
.overdue {{ color: #c62828; font-weight: bold; }}
.cards {{ display: flex; gap: 1rem; flex-wrap: wrap; }}
.card {{ border: 1px solid #ddd; padding: .5rem 1rem; }}
</style>
</head>
<body>
<nav>{nav}</nav>
{messages}
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        messages = messages,
        body = body,
    )
}

fn search_form(action: &str, q: Option<&str>) -> String {
    format!(
        r#"<form method="get" action="{}">
<input type="search" name="q" value="{}" placeholder="Title, author or ISBN">
<button type="submit">Search</button>
</form>"#,
        action,
        escape(q.unwrap_or(""))
    )
}

pub fn home(books: &[Book], q: Option<&str>) -> String {
    let mut rows = String::new();
    for book in books {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} / {}</td></tr>",
            escape(&book.titulo),
            escape(&book.autor),
            opt(book.genero.as_deref()),
            opt(book.idioma.as_deref()),
            book.ejemplares_disponibles,
            book.total_ejemplares
        ));
    }
    if books.is_empty() {
        rows.push_str(r#"<tr><td colspan="5">No books found.</td></tr>"#);
    }

    format!(
        r#"{}
<table>
<thead><tr><th>Title</th><th>Author</th><th>Genre</th><th>Language</th><th>Available</th></tr></thead>
<tbody>{}</tbody>
</table>
<p><a href="/login">Log in</a> to reserve books.</p>"#,
        search_form("/home", q),
        rows
    )
}

pub fn login() -> String {
    r#"<form method="post" action="/login">
<label>Email <input type="email" name="correo" required></label>
<label>Password <input type="password" name="password" required></label>
<button type="submit">Log in</button>
</form>
<p>No account yet? See <a href="/register">how to register</a>.</p>"#
        .to_string()
}

/// Anonymous visitors get a notice; administrators get the account form
pub fn register(session: Option<&UserClaims>) -> String {
    match session {
        Some(claims) if claims.is_admin() => r#"<form method="post" action="/register">
<label>Full name <input name="nombre_completo" required></label>
<label>Identification <input name="identificacion" required></label>
<label>Email <input type="email" name="correo" required></label>
<label>Password <input type="password" name="password" minlength="6" required></label>
<label>Phone <input name="telefono"></label>
<label>Address <input name="direccion"></label>
<label>Role <select name="role">
<option value="estudiante">Student</option>
<option value="admin">Administrator</option>
</select></label>
<button type="submit">Create account</button>
</form>"#
            .to_string(),
        _ => r#"<p>Accounts are created by library staff. Please ask at the front desk with your identification.</p>
<p>Already registered? <a href="/login">Log in</a>.</p>"#
            .to_string(),
    }
}

pub fn customer(view: &CustomerView, q: Option<&str>) -> String {
    let today = Utc::now().date_naive();
    let mut html = String::new();

    html.push_str("<h2>Catalog</h2>");
    html.push_str(&search_form(CUSTOMER_PATH, q));
    html.push_str("<table><thead><tr><th>Title</th><th>Author</th><th>Available</th><th></th></tr></thead><tbody>");
    for book in &view.catalog {
        html.push_str(&format!(
            r#"<tr><td>{titulo}</td><td>{autor}</td><td>{disp} / {total}</td><td>
<form method="post" action="/customerviews/reservar" class="inline">
<input type="hidden" name="id_libro" value="{id}">
<input name="observaciones_usuario" placeholder="Notes">
<button type="submit">Reserve</button></form>
<form method="post" action="/customerviews/favoritos" class="inline">
<input type="hidden" name="id_libro" value="{id}">
<select name="calificacion"><option value="">No rating</option><option>1</option><option>2</option><option>3</option><option>4</option><option>5</option></select>
<button type="submit">Favorite</button></form>
</td></tr>"#,
            titulo = escape(&book.titulo),
            autor = escape(&book.autor),
            disp = book.ejemplares_disponibles,
            total = book.total_ejemplares,
            id = book.id_libro,
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str("<h2>My reservations</h2><table><thead><tr><th>Book</th><th>Status</th><th>Reserved</th><th>Expires</th><th></th></tr></thead><tbody>");
    for reservation in &view.reservations {
        let action = if reservation.estado.can_cancel() {
            format!(
                r#"<form method="post" action="/customerviews/reservas/{}/cancelar" class="inline"><button type="submit">Cancel</button></form>"#,
                reservation.id_reserva
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&reservation.titulo_libro),
            reservation.estado,
            reservation.fecha_reserva.format("%Y-%m-%d"),
            reservation
                .fecha_expiracion
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            action
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str("<h2>My loans</h2><table><thead><tr><th>Book</th><th>Copy</th><th>Due</th><th>Returned</th></tr></thead><tbody>");
    for loan in &view.loans {
        let due = if loan.is_overdue(today) {
            format!(r#"<span class="overdue">{} (overdue)</span>"#, loan.fecha_devolucion_esperada)
        } else {
            loan.fecha_devolucion_esperada.to_string()
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&loan.titulo_libro),
            escape(&loan.codigo_ejemplar),
            due,
            loan.fecha_devolucion_real
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str("<h2>Favorites</h2><table><thead><tr><th>Book</th><th>Rating</th><th>Review</th><th></th></tr></thead><tbody>");
    for favorite in &view.favorites {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><form method="post" action="/customerviews/favoritos/{}/eliminar" class="inline"><button type="submit">Remove</button></form></td></tr>"#,
            escape(&favorite.titulo),
            favorite
                .calificacion
                .map(|c| format!("{}/5", c))
                .unwrap_or_else(|| "-".to_string()),
            opt(favorite.resena.as_deref()),
            favorite.id_libro
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str("<h2>Notifications</h2><ul>");
    for notification in &view.notifications {
        let action = if notification.leida {
            String::new()
        } else {
            format!(
                r#" <form method="post" action="/customerviews/notificaciones/{}/leida" class="inline"><button type="submit">Mark as read</button></form>"#,
                notification.id_notificacion
            )
        };
        html.push_str(&format!(
            "<li><strong>{}</strong>: {}{}</li>",
            escape(&notification.asunto),
            escape(&notification.mensaje),
            action
        ));
    }
    if view.notifications.is_empty() {
        html.push_str("<li>No notifications.</li>");
    }
    html.push_str("</ul>");

    html
}

pub fn admin(view: &AdminView) -> String {
    let stats = &view.stats;
    let mut html = format!(
        r#"<div class="cards">
<div class="card">Books<br><strong>{}</strong></div>
<div class="card">Copies available<br><strong>{} / {}</strong></div>
<div class="card">Active users<br><strong>{} / {}</strong></div>
<div class="card">Open loans<br><strong>{}</strong> ({} overdue)</div>
<div class="card">Reservations<br><strong>{}</strong> pending, {} approved</div>
</div>"#,
        stats.total_libros,
        stats.ejemplares_disponibles,
        stats.total_ejemplares,
        stats.usuarios_activos,
        stats.total_usuarios,
        stats.prestamos_activos,
        stats.prestamos_vencidos,
        stats.reservas_pendientes,
        stats.reservas_aprobadas,
    );

    html.push_str("<h2>Most reserved</h2><table><thead><tr><th>Title</th><th>Author</th><th>Reservations</th><th>Pending</th></tr></thead><tbody>");
    for book in &view.most_reserved {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&book.titulo),
            escape(&book.autor),
            book.total_reservas,
            book.reservas_pendientes
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(
        r#"<h2>Reservations</h2><table><thead><tr><th>#</th><th>User</th><th>Book</th><th>Status</th><th></th></tr></thead><tbody>"#,
    );
    for reservation in &view.reservations {
        let id = reservation.id_reserva;
        let actions = match reservation.estado {
            crate::models::ReservationStatus::Pendiente => format!(
                r#"<form method="post" action="/adminviews/reservas/{id}/aprobar" class="inline"><button type="submit">Approve</button></form>
<form method="post" action="/adminviews/reservas/{id}/rechazar" class="inline"><input name="motivo" placeholder="Reason" required><button type="submit">Reject</button></form>"#
            ),
            crate::models::ReservationStatus::Aprobada => format!(
                r#"<form method="post" action="/adminviews/prestamos" class="inline"><input type="hidden" name="id_reserva" value="{id}"><input name="id_ejemplar" placeholder="Copy id" required><button type="submit">Lend</button></form>"#
            ),
            _ => String::new(),
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            id,
            escape(&reservation.nombre_usuario),
            escape(&reservation.titulo_libro),
            reservation.estado,
            actions
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(
        r#"<h2>Loans</h2>
<form method="post" action="/adminviews/prestamos">
<input name="id_usuario" placeholder="User id" required>
<input name="id_ejemplar" placeholder="Copy id" required>
<input name="dias_prestamo" placeholder="Days">
<button type="submit">Lend without reservation</button>
</form>
<table><thead><tr><th>#</th><th>User</th><th>Book</th><th>Copy</th><th>Due</th><th>State</th><th></th></tr></thead><tbody>"#,
    );
    for loan in &view.loans {
        let action = if loan.fecha_devolucion_real.is_none() {
            format!(
                r#"<form method="post" action="/adminviews/prestamos/{}/devolver" class="inline"><button type="submit">Return</button></form>"#,
                loan.id_prestamo
            )
        } else {
            String::new()
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            loan.id_prestamo,
            escape(&loan.nombre_usuario),
            escape(&loan.titulo_libro),
            escape(&loan.codigo_ejemplar),
            loan.fecha_devolucion_esperada,
            escape(&loan.estado_nombre),
            action
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(
        r#"<h2>Books</h2>
<form method="post" action="/adminviews/libros">
<input name="titulo" placeholder="Title" required>
<input name="autor" placeholder="Author" required>
<input name="isbn" placeholder="ISBN">
<input name="genero" placeholder="Genre">
<input name="editorial" placeholder="Publisher">
<input name="anio_publicacion" placeholder="Year">
<button type="submit">Add book</button>
</form>
<table><thead><tr><th>#</th><th>Title</th><th>Author</th><th>ISBN</th><th>Copies</th><th></th></tr></thead><tbody>"#,
    );
    for book in &view.books {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} / {}</td><td><form method="post" action="/adminviews/libros/{}/eliminar" class="inline"><button type="submit">Delete</button></form></td></tr>"#,
            book.id_libro,
            escape(&book.titulo),
            escape(&book.autor),
            opt(book.isbn.as_deref()),
            book.ejemplares_disponibles,
            book.total_ejemplares,
            book.id_libro
        ));
    }
    html.push_str("</tbody></table>");

    html.push_str(
        r#"<h2>Users</h2><p><a href="/register">Create account</a></p>
<table><thead><tr><th>#</th><th>Name</th><th>Email</th><th>Role</th><th>Status</th><th></th></tr></thead><tbody>"#,
    );
    for user in &view.users {
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><form method="post" action="/adminviews/usuarios/{}/eliminar" class="inline"><button type="submit">Delete</button></form></td></tr>"#,
            user.id_usuario,
            escape(&user.nombre_completo),
            escape(&user.correo),
            user.role,
            user.estado_cuenta,
            user.id_usuario
        ));
    }
    html.push_str("</tbody></table>");

    html
}

pub fn not_found() -> String {
    r#"<p>The page you are looking for does not exist.</p><p><a href="/home">Back to the catalog</a></p>"#
        .to_string()
}

pub fn failure(message: &str) -> String {
    format!(
        r#"<p class="flash error">{}</p><p><a href="/home">Back to the catalog</a></p>"#,
        escape(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn book(titulo: &str) -> Book {
        Book {
            id_libro: 3,
            isbn: None,
            titulo: titulo.to_string(),
            autor: "Cortázar".to_string(),
            editorial: None,
            anio_publicacion: None,
            genero: Some("Novela".to_string()),
            descripcion: None,
            portada_url: None,
            link: None,
            idioma: Some("Español".to_string()),
            num_paginas: None,
            total_ejemplares: 2,
            ejemplares_disponibles: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_flash_messages_are_escaped() {
        let flash = Flash {
            error: Some("<b>bad</b>".into()),
            ..Default::default()
        };
        let html = layout("Login", None, &flash, "");
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(!html.contains("<b>bad</b>"));
    }

    #[test]
    fn test_home_lists_books_escaped() {
        let html = home(&[book("Rayuela <1963>")], Some("ray"));
        assert!(html.contains("Rayuela &lt;1963&gt;"));
        assert!(html.contains("1 / 2"));
        assert!(html.contains(r#"value="ray""#));
    }

    #[test]
    fn test_register_form_only_for_admins() {
        let admin = UserClaims {
            sub: "admin@biblioteca.test".into(),
            id: 1,
            correo: "admin@biblioteca.test".into(),
            role: Role::Admin,
            exp: 0,
            iat: 0,
        };
        assert!(register(Some(&admin)).contains(r#"action="/register""#));
        assert!(!register(None).contains("<form"));
    }

    #[test]
    fn test_customer_catalog_offers_reservation() {
        let view = CustomerView {
            catalog: vec![book("Rayuela")],
            reservations: Vec::new(),
            loans: Vec::new(),
            favorites: Vec::new(),
            notifications: Vec::new(),
        };
        let html = customer(&view, None);
        assert!(html.contains(r#"action="/customerviews/reservar""#));
        assert!(html.contains(r#"name="id_libro" value="3""#));
        assert!(html.contains("No notifications."));
    }
}
