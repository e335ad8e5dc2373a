//! Loan and reservation state management

use crate::{
    error::{AppError, AppResult},
    models::{
        non_empty,
        state::{StateInput, StateKind, StateRecord},
    },
    repository::{states::StateFields, Repository},
};

#[derive(Clone)]
pub struct StatesService {
    repository: Repository,
}

/// Validated owned copy of a state request
struct ValidState {
    nombre: String,
    descripcion: Option<String>,
    tipo: StateKind,
    color: Option<String>,
}

impl ValidState {
    fn fields(&self) -> StateFields<'_> {
        StateFields {
            nombre: &self.nombre,
            descripcion: self.descripcion.as_deref(),
            tipo: self.tipo,
            color: self.color.as_deref(),
        }
    }
}

fn validate(input: StateInput) -> AppResult<ValidState> {
    let (Some(nombre), Some(tipo)) = (non_empty(input.nombre), non_empty(input.tipo)) else {
        return Err(AppError::Validation("nombre and tipo are required".to_string()));
    };
    let tipo: StateKind = tipo
        .parse()
        .map_err(|_| AppError::Validation("tipo must be 'prestamo' or 'reserva'".to_string()))?;

    Ok(ValidState {
        nombre,
        descripcion: non_empty(input.descripcion),
        tipo,
        color: non_empty(input.color),
    })
}

impl StatesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<StateRecord>> {
        self.repository.states.list().await
    }

    pub async fn get(&self, id: i32) -> AppResult<StateRecord> {
        self.repository.states.get_by_id(id).await
    }

    pub async fn create(&self, input: StateInput) -> AppResult<StateRecord> {
        let state = validate(input)?;
        self.repository.states.create(&state.fields()).await
    }

    pub async fn update(&self, id: i32, input: StateInput) -> AppResult<StateRecord> {
        let state = validate(input)?;
        self.repository.states.update(id, &state.fields()).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.states.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_must_be_known() {
        let input = StateInput {
            nombre: Some("Perdido".into()),
            tipo: Some("inventario".into()),
            ..Default::default()
        };
        match validate(input) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("prestamo")),
            _ => panic!("expected a validation error"),
        }
    }

    #[test]
    fn test_kind_is_case_insensitive() {
        let input = StateInput {
            nombre: Some("Perdido".into()),
            tipo: Some("Prestamo".into()),
            ..Default::default()
        };
        let state = validate(input).unwrap();
        assert_eq!(state.tipo, StateKind::Prestamo);
    }
}
