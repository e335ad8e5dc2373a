//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult, DbResultExt},
    models::user::{NewUser, UpdateUser, User, UserCredentials},
};

const USER_COLUMNS: &str = "id_usuario, nombre_completo, identificacion, correo, telefono, \
    direccion, foto_perfil, role, estado_cuenta, fecha_registro, max_prestamos, max_reservas, created_at";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

/// Duplicate message naming the unique column that was hit
fn user_write_error(err: sqlx::Error) -> AppError {
    let duplicate = match AppError::constraint_of(&err) {
        Some("usuarios_identificacion_key") => "Identification is already registered",
        _ => "Email is already registered",
    };
    AppError::from_db(err, duplicate, "User has loans and cannot be deleted")
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios ORDER BY id_usuario",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM usuarios WHERE id_usuario = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Credentials lookup for login; emails are compared case-insensitively
    pub async fn get_credentials(&self, correo: &str) -> AppResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT id_usuario, nombre_completo, correo, password, role, estado_cuenta
            FROM usuarios
            WHERE LOWER(correo) = LOWER($1)
            "#,
        )
        .bind(correo)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn create(&self, user: &NewUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO usuarios
                (nombre_completo, password, identificacion, correo, telefono, direccion, role, estado_cuenta)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.nombre_completo)
        .bind(&user.password_hash)
        .bind(&user.identificacion)
        .bind(&user.correo)
        .bind(&user.telefono)
        .bind(&user.direccion)
        .bind(user.role)
        .bind(user.estado_cuenta)
        .fetch_one(&self.pool)
        .await
        .map_err(user_write_error)
    }

    /// Update the provided fields only
    pub async fn update(&self, id: i32, user: &UpdateUser) -> AppResult<User> {
        let mut sets: Vec<String> = Vec::new();
        let mut param_idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(user.nombre_completo, "nombre_completo");
        add_field!(user.identificacion, "identificacion");
        add_field!(user.correo, "correo");
        add_field!(user.telefono, "telefono");
        add_field!(user.direccion, "direccion");
        add_field!(user.role, "role");
        add_field!(user.estado_cuenta, "estado_cuenta");
        add_field!(user.max_prestamos, "max_prestamos");
        add_field!(user.max_reservas, "max_reservas");

        if sets.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        let query = format!(
            "UPDATE usuarios SET {} WHERE id_usuario = $1",
            sets.join(", ")
        );

        let mut builder = sqlx::query(&query).bind(id);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.nombre_completo);
        bind_field!(user.identificacion);
        bind_field!(user.correo);
        bind_field!(user.telefono);
        bind_field!(user.direccion);
        bind_field!(user.role);
        bind_field!(user.estado_cuenta);
        bind_field!(user.max_prestamos);
        bind_field!(user.max_reservas);

        let result = builder.execute(&self.pool).await.map_err(user_write_error)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id_usuario = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_constraint("User already exists", "User has loans and cannot be deleted")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }

        Ok(())
    }

    /// Whether at least one administrator account exists
    pub async fn admin_exists(&self) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM usuarios WHERE role = 'admin')")
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}