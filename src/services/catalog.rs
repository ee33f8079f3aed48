//! Book catalog service

use crate::{
    error::AppResult,
    models::book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
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

    /// List books matching the query
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        self.repository.books.list(query).await
    }

    /// Get a single book
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog
    pub async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        self.repository.books.create(book).await
    }

    /// Update a catalog entry
    pub async fn update_book(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, book).await
    }

    /// Remove a book from the catalog
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}
