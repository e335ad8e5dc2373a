//! Catalog service: books and their copies

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookInput, BookQuery, DEFAULT_LANGUAGE},
        copy::{BookCopy, CreateCopy, UpdateCopy},
        non_empty,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search_books(&self, query: BookQuery) -> AppResult<Vec<Book>> {
        let query = BookQuery {
            q: non_empty(query.q),
            genero: non_empty(query.genero),
        };
        self.repository.books.search(&query).await
    }

    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let input = input.normalized();
        if input.titulo.is_none() || input.autor.is_none() {
            return Err(AppError::Validation("titulo and autor are required".to_string()));
        }
        input.validate()?;

        let idioma = input.idioma.clone().unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
        let book = self.repository.books.create(&input, &idioma).await?;
        tracing::info!(id_libro = book.id_libro, titulo = %book.titulo, "Book created");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        let input = input.normalized();
        if input.titulo.is_none() && input.autor.is_none() {
            return Err(AppError::Validation("titulo or autor is required".to_string()));
        }
        input.validate()?;

        self.repository.books.update(id, &input).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(id_libro = id, "Book deleted");
        Ok(())
    }

    /// Copies of a book; 404 when the book does not exist
    pub async fn list_book_copies(&self, id_libro: i32) -> AppResult<Vec<BookCopy>> {
        if !self.repository.books.exists(id_libro).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id_libro)));
        }
        self.repository.copies.list_for_book(id_libro).await
    }

    pub async fn list_copies(&self) -> AppResult<Vec<BookCopy>> {
        self.repository.copies.list().await
    }

    pub async fn get_copy(&self, id: i32) -> AppResult<BookCopy> {
        self.repository.copies.get_by_id(id).await
    }

    pub async fn create_copy(&self, request: CreateCopy) -> AppResult<BookCopy> {
        let (Some(id_libro), Some(codigo)) = (request.id_libro, non_empty(request.codigo_ejemplar)) else {
            return Err(AppError::Validation("id_libro and codigo_ejemplar are required".to_string()));
        };
        let ubicacion = non_empty(request.ubicacion);
        let observaciones = non_empty(request.observaciones);

        let copy = self
            .repository
            .copies
            .create(
                id_libro,
                &codigo,
                ubicacion.as_deref(),
                request.estado_fisico.unwrap_or_default(),
                observaciones.as_deref(),
            )
            .await?;
        tracing::info!(id_ejemplar = copy.id_ejemplar, id_libro, "Copy created");
        Ok(copy)
    }

    pub async fn update_copy(&self, id: i32, request: UpdateCopy) -> AppResult<BookCopy> {
        let update = UpdateCopy {
            ubicacion: non_empty(request.ubicacion),
            estado_fisico: request.estado_fisico,
            observaciones: non_empty(request.observaciones),
        };
        if update.ubicacion.is_none() && update.estado_fisico.is_none() && update.observaciones.is_none() {
            return Err(AppError::Validation("At least one field to update is required".to_string()));
        }

        self.repository.copies.update(id, &update).await
    }

    pub async fn delete_copy(&self, id: i32) -> AppResult<()> {
        self.repository.copies.delete(id).await
    }
}
