//! Borrowings repository for database operations

use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrowing::{
            validate_dates, Borrowing, BorrowingDetails, BorrowingQuery, BorrowingSummary,
            OverdueBorrowing,
        },
        user::UserSummary,
    },
};

/// Visibility scope applied to list/detail queries
#[derive(Debug, Clone, Copy)]
pub enum BorrowingScope {
    /// Staff callers see every borrowing
    All,
    /// Regular callers see only their own borrowings
    User(i32),
}

#[derive(Clone)]
pub struct BorrowingsRepository {
    pool: Pool<Postgres>,
}

impl BorrowingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrowing by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Borrowing> {
        sqlx::query_as::<_, Borrowing>("SELECT * FROM borrowings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))
    }

    /// Create a new borrowing.
    ///
    /// The inventory decrement and the borrowing insert run in a single
    /// transaction. The decrement is a conditional update so two
    /// concurrent borrows of the last copy cannot both succeed; when no
    /// row changes the whole transaction rolls back and no partial state
    /// remains.
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        expected_return_date: NaiveDate,
    ) -> AppResult<BorrowingDetails> {
        let borrow_date = Utc::now().date_naive();
        validate_dates(borrow_date, expected_return_date, None)?;

        let mut tx = self.pool.begin().await?;

        let decremented = sqlx::query(
            "UPDATE books SET inventory = inventory - 1 WHERE id = $1 AND inventory > 0",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if decremented.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                    .bind(book_id)
                    .fetch_one(&mut *tx)
                    .await?;
            // Dropping the transaction rolls it back
            return Err(if exists {
                AppError::OutOfStock(format!("No copies of book {} available", book_id))
            } else {
                AppError::NotFound(format!("Book with id {} not found", book_id))
            });
        }

        let borrowing_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO borrowings (borrow_date, expected_return_date, book_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(borrow_date)
        .bind(expected_return_date)
        .bind(book_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_details(borrowing_id, BorrowingScope::All).await
    }

    /// Close a borrowing and restore the book's inventory.
    ///
    /// The borrowing row is locked for the duration of the transaction so
    /// a concurrent return of the same borrowing observes the closed
    /// state. The date stamp and the inventory increment commit together
    /// or not at all.
    pub async fn return_borrowing(&self, id: i32) -> AppResult<BorrowingDetails> {
        let today = Utc::now().date_naive();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT book_id, actual_return_date FROM borrowings WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        let book_id: i32 = row.get("book_id");
        let actual_return_date: Option<NaiveDate> = row.get("actual_return_date");

        if actual_return_date.is_some() {
            return Err(AppError::AlreadyReturned("Book already returned".to_string()));
        }

        sqlx::query("UPDATE borrowings SET actual_return_date = $1 WHERE id = $2")
            .bind(today)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE books SET inventory = inventory + 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.get_details(id, BorrowingScope::All).await
    }

    /// Get borrowing with joined book and user details
    pub async fn get_details(
        &self,
        id: i32,
        scope: BorrowingScope,
    ) -> AppResult<BorrowingDetails> {
        let mut sql = String::from(
            r#"
            SELECT bo.id, bo.borrow_date, bo.expected_return_date, bo.actual_return_date,
                   b.id as book_id, b.title, b.author, b.cover, b.inventory, b.daily_fee,
                   u.id as user_id, u.email, u.first_name, u.last_name
            FROM borrowings bo
            JOIN books b ON bo.book_id = b.id
            JOIN users u ON bo.user_id = u.id
            WHERE bo.id = $1
            "#,
        );
        if matches!(scope, BorrowingScope::User(_)) {
            sql.push_str(" AND bo.user_id = $2");
        }

        let mut query = sqlx::query(&sql).bind(id);
        if let BorrowingScope::User(user_id) = scope {
            query = query.bind(user_id);
        }

        let row = query
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrowing with id {} not found", id)))?;

        let actual_return_date: Option<NaiveDate> = row.get("actual_return_date");

        Ok(BorrowingDetails {
            id: row.get("id"),
            borrow_date: row.get("borrow_date"),
            expected_return_date: row.get("expected_return_date"),
            actual_return_date,
            is_active: actual_return_date.is_none(),
            book: Book {
                id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                cover: row.get("cover"),
                inventory: row.get("inventory"),
                daily_fee: row.get("daily_fee"),
            },
            user: UserSummary {
                id: row.get("user_id"),
                email: row.get("email"),
                first_name: row.get("first_name"),
                last_name: row.get("last_name"),
            },
        })
    }

    /// List borrowings, most recent first
    pub async fn list(
        &self,
        query: &BorrowingQuery,
        scope: BorrowingScope,
    ) -> AppResult<(Vec<BorrowingSummary>, i64)> {
        // Within a user scope any user_id filter collapses to the caller
        let user_filter: Option<i32> = match scope {
            BorrowingScope::User(user_id) => Some(user_id),
            BorrowingScope::All => query.user_id,
        };

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let borrowings = sqlx::query_as::<_, BorrowingSummary>(
            r#"
            SELECT bo.id, bo.borrow_date, bo.expected_return_date, bo.actual_return_date,
                   b.title as book_title, u.email as user_email
            FROM borrowings bo
            JOIN books b ON bo.book_id = b.id
            JOIN users u ON bo.user_id = u.id
            WHERE ($1::int IS NULL OR bo.user_id = $1)
              AND ($2::bool IS NULL OR (bo.actual_return_date IS NULL) = $2)
            ORDER BY bo.borrow_date DESC, bo.id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_filter)
        .bind(query.is_active)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM borrowings bo
            WHERE ($1::int IS NULL OR bo.user_id = $1)
              AND ($2::bool IS NULL OR (bo.actual_return_date IS NULL) = $2)
            "#,
        )
        .bind(user_filter)
        .bind(query.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok((borrowings, total))
    }

    /// Active borrowings due on or before the threshold date
    pub async fn find_due_soon(&self, threshold: NaiveDate) -> AppResult<Vec<OverdueBorrowing>> {
        let overdue = sqlx::query_as::<_, OverdueBorrowing>(
            r#"
            SELECT bo.id, bo.expected_return_date,
                   b.title as book_title, u.email as user_email
            FROM borrowings bo
            JOIN books b ON bo.book_id = b.id
            JOIN users u ON bo.user_id = u.id
            WHERE bo.actual_return_date IS NULL
              AND bo.expected_return_date <= $1
            ORDER BY bo.expected_return_date, bo.id
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;

        Ok(overdue)
    }
}
