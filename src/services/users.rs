//! User management service

use validator::Validate;

use crate::{
    config::BootstrapAdmin,
    error::{AppError, AppResult},
    models::{
        non_empty,
        user::{AccountStatus, CreateUser, NewUser, Role, UpdateUser, User, UserClaims},
    },
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get(&self, claims: &UserClaims, id: i32) -> AppResult<User> {
        claims.require_self_or_admin(id)?;
        self.repository.users.get_by_id(id).await
    }

    /// Create an account (administrators only, checked by the caller)
    pub async fn create(&self, request: CreateUser) -> AppResult<User> {
        let new_user = prepare_new_user(request)?;
        let user = self.repository.users.create(&new_user).await?;
        tracing::info!(id_usuario = user.id_usuario, role = %user.role, "User created");
        Ok(user)
    }

    pub async fn update(&self, claims: &UserClaims, id: i32, request: UpdateUser) -> AppResult<User> {
        claims.require_self_or_admin(id)?;
        let update = prepare_update(claims, request)?;
        self.repository.users.update(id, &update).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(id_usuario = id, "User deleted");
        Ok(())
    }

    /// Create the configured administrator on a fresh database
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> AppResult<()> {
        if self.repository.users.admin_exists().await? {
            return Ok(());
        }

        let request = CreateUser {
            nombre_completo: Some(admin.nombre_completo.clone()),
            password: Some(admin.password.clone()),
            identificacion: Some(admin.identificacion.clone()),
            correo: Some(admin.correo.clone()),
            role: Some(Role::Admin),
            estado_cuenta: Some(AccountStatus::Activo),
            ..Default::default()
        };
        let user = self.create(request).await?;
        tracing::warn!(correo = %user.correo, "Bootstrap administrator created");
        Ok(())
    }
}

/// Check required fields, validate formats and hash the password
fn prepare_new_user(request: CreateUser) -> AppResult<NewUser> {
    let request = CreateUser {
        nombre_completo: non_empty(request.nombre_completo),
        password: request.password.filter(|p| !p.is_empty()),
        identificacion: non_empty(request.identificacion),
        correo: non_empty(request.correo),
        telefono: non_empty(request.telefono),
        direccion: non_empty(request.direccion),
        ..request
    };

    let (Some(nombre_completo), Some(password), Some(identificacion), Some(correo)) = (
        request.nombre_completo.clone(),
        request.password.clone(),
        request.identificacion.clone(),
        request.correo.clone(),
    ) else {
        return Err(AppError::Validation(
            "nombre_completo, password, identificacion and correo are required".to_string(),
        ));
    };

    request.validate()?;

    Ok(NewUser {
        nombre_completo,
        password_hash: hash_password(&password)?,
        identificacion,
        correo,
        telefono: request.telefono,
        direccion: request.direccion,
        role: request.role.unwrap_or(Role::Estudiante),
        estado_cuenta: request.estado_cuenta.unwrap_or(AccountStatus::Activo),
    })
}

/// Enforce who may change what, then drop blank values
fn prepare_update(claims: &UserClaims, request: UpdateUser) -> AppResult<UpdateUser> {
    if !claims.is_admin() && request.touches_admin_fields() {
        return Err(AppError::Authorization(
            "Only administrators can change role, account status or limits".to_string(),
        ));
    }

    let update = UpdateUser {
        nombre_completo: non_empty(request.nombre_completo),
        identificacion: non_empty(request.identificacion),
        correo: non_empty(request.correo),
        telefono: non_empty(request.telefono),
        direccion: request.direccion.map(non_empty),
        ..request
    };

    if update.is_empty() {
        return Err(AppError::Validation("At least one field to update is required".to_string()));
    }

    update.validate()?;
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn claims(id: i32, role: Role) -> UserClaims {
        UserClaims {
            sub: "a@b.c".into(),
            id,
            correo: "a@b.c".into(),
            role,
            exp: Utc::now().timestamp() + 60,
            iat: Utc::now().timestamp(),
        }
    }

    fn full_request() -> CreateUser {
        CreateUser {
            nombre_completo: Some("Ana Pérez".into()),
            password: Some("secreto123".into()),
            identificacion: Some("1020304050".into()),
            correo: Some("ana@biblioteca.test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_user_defaults_and_hash() {
        let user = prepare_new_user(full_request()).unwrap();
        assert_eq!(user.role, Role::Estudiante);
        assert_eq!(user.estado_cuenta, AccountStatus::Activo);
        assert_ne!(user.password_hash, "secreto123");
    }

    #[test]
    fn test_new_user_requires_fields() {
        let request = CreateUser {
            identificacion: Some("   ".into()),
            ..full_request()
        };
        assert!(matches!(prepare_new_user(request), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_new_user_rejects_bad_email() {
        let request = CreateUser {
            correo: Some("not-an-email".into()),
            ..full_request()
        };
        match prepare_new_user(request) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Invalid email format"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_student_cannot_touch_admin_fields() {
        let request = UpdateUser {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let err = prepare_update(&claims(5, Role::Estudiante), request).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_update_requires_a_field() {
        let request = UpdateUser {
            nombre_completo: Some(" ".into()),
            ..Default::default()
        };
        let err = prepare_update(&claims(1, Role::Admin), request).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
