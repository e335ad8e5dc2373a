//! User model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

text_enum! {
    /// User role
    pub enum Role {
        Admin => "admin",
        Estudiante => "estudiante",
    }
}

text_enum! {
    /// Account status; only `activo` accounts may log in or reserve
    pub enum AccountStatus {
        Activo => "activo",
        Inactivo => "inactivo",
        Suspendido => "suspendido",
    }
}

/// Full user model from database (password excluded)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id_usuario: i32,
    pub nombre_completo: String,
    pub identificacion: String,
    pub correo: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub foto_perfil: Option<String>,
    pub role: Role,
    pub estado_cuenta: AccountStatus,
    pub fecha_registro: Option<NaiveDate>,
    pub max_prestamos: i32,
    pub max_reservas: i32,
    pub created_at: DateTime<Utc>,
}

/// Row used by the login flow
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id_usuario: i32,
    pub nombre_completo: String,
    pub correo: String,
    /// Argon2 PHC string
    pub password: String,
    pub role: Role,
    pub estado_cuenta: AccountStatus,
}

/// Create user request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub nombre_completo: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
    pub identificacion: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub correo: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub role: Option<Role>,
    pub estado_cuenta: Option<AccountStatus>,
}

/// Validated user insert, password already hashed
#[derive(Debug)]
pub struct NewUser {
    pub nombre_completo: String,
    pub password_hash: String,
    pub identificacion: String,
    pub correo: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub role: Role,
    pub estado_cuenta: AccountStatus,
}

/// Update user request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub nombre_completo: Option<String>,
    pub identificacion: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub correo: Option<String>,
    pub telefono: Option<String>,
    /// `null` clears the address, absence leaves it untouched
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub direccion: Option<Option<String>>,
    pub role: Option<Role>,
    pub estado_cuenta: Option<AccountStatus>,
    #[validate(range(min = 0, max = 50, message = "Loan limit must be between 0 and 50"))]
    pub max_prestamos: Option<i32>,
    #[validate(range(min = 0, max = 50, message = "Reservation limit must be between 0 and 50"))]
    pub max_reservas: Option<i32>,
}

impl UpdateUser {
    /// Fields only an administrator may change
    pub fn touches_admin_fields(&self) -> bool {
        self.role.is_some()
            || self.estado_cuenta.is_some()
            || self.max_prestamos.is_some()
            || self.max_reservas.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.nombre_completo.is_none()
            && self.identificacion.is_none()
            && self.correo.is_none()
            && self.telefono.is_none()
            && self.direccion.is_none()
            && !self.touches_admin_fields()
    }
}

fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserClaims {
    pub sub: String,
    pub id: i32,
    pub correo: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Check if user is admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator role required".to_string()))
        }
    }

    /// The caller must be the owner of the record, or an admin
    pub fn require_self_or_admin(&self, user_id: i32) -> Result<(), AppError> {
        if self.is_admin() || self.id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Access denied".to_string()))
        }
    }

    /// The caller must be the owner of the record
    pub fn require_self(&self, user_id: i32) -> Result<(), AppError> {
        if self.id == user_id {
            Ok(())
        } else {
            Err(AppError::Authorization("Access denied".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(id: i32, role: Role) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: format!("user{}@biblioteca.test", id),
            id,
            correo: format!("user{}@biblioteca.test", id),
            role,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_identity() {
        let issued = claims(7, Role::Estudiante);
        let token = issued.create_token("secret").unwrap();
        let decoded = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.role, Role::Estudiante);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut expired = claims(1, Role::Admin);
        expired.iat -= 7200;
        expired.exp = expired.iat + 60;
        let token = expired.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_ownership_checks() {
        let student = claims(3, Role::Estudiante);
        assert!(student.require_self_or_admin(3).is_ok());
        assert!(student.require_self_or_admin(4).is_err());
        assert!(student.require_admin().is_err());

        let admin = claims(1, Role::Admin);
        assert!(admin.require_self_or_admin(4).is_ok());
        assert!(admin.require_self(4).is_err());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(Role::Estudiante.to_string(), "estudiante");
        assert!("bibliotecario".parse::<Role>().is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: UpdateUser = serde_json::from_str(r#"{"direccion": null}"#).unwrap();
        assert_eq!(cleared.direccion, Some(None));
        assert!(!cleared.is_empty());

        let untouched: UpdateUser = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(untouched.direccion, None);
        assert!(untouched.is_empty());
    }

    #[test]
    fn test_admin_fields_detected() {
        let update: UpdateUser = serde_json::from_str(r#"{"max_reservas": 2}"#).unwrap();
        assert!(update.touches_admin_fields());
    }
}
