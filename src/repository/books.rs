//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, BookSummary, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List books with title/author filters and pagination
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<BookSummary>, i64)> {
        let title = query
            .title
            .as_deref()
            .map(|t| format!("%{}%", t))
            .unwrap_or_else(|| "%".to_string());
        let author = query
            .author
            .as_deref()
            .map(|a| format!("%{}%", a))
            .unwrap_or_else(|| "%".to_string());

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let books = sqlx::query_as::<_, BookSummary>(
            r#"
            SELECT id, title, author, inventory
            FROM books
            WHERE title ILIKE $1 AND author ILIKE $2
            ORDER BY title, author
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(&title)
        .bind(&author)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE title ILIKE $1 AND author ILIKE $2",
        )
        .bind(&title)
        .bind(&author)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, cover, inventory, daily_fee)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover)
        .bind(book.inventory)
        .bind(book.daily_fee)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
                format!("Book '{}' by {} already exists", book.title, book.author),
            ),
            _ => e.into(),
        })
    }

    /// Update an existing book
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($2, title),
                author = COALESCE($3, author),
                cover = COALESCE($4, cover),
                inventory = COALESCE($5, inventory),
                daily_fee = COALESCE($6, daily_fee)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.cover)
        .bind(book.inventory)
        .bind(book.daily_fee)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("A book with this title and author already exists".to_string())
            }
            _ => e.into(),
        })?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Delete a book (borrowings referencing it are removed by cascade)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
