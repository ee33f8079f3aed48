//! Borrowing (loan transaction) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, AppResult};

use super::book::Book;
use super::user::UserSummary;

/// Borrowing model from database.
///
/// A borrowing is created only through the borrow workflow and closed
/// exactly once through the return workflow; `actual_return_date` never
/// transitions back to null.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrowing {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book_id: i32,
    pub user_id: i32,
}

impl Borrowing {
    /// A borrowing is active while the book has not been returned
    pub fn is_active(&self) -> bool {
        self.actual_return_date.is_none()
    }
}

/// Validate the date ordering constraints of a borrowing.
///
/// Both return dates must fall on or after the borrow date.
pub fn validate_dates(
    borrow_date: NaiveDate,
    expected_return_date: NaiveDate,
    actual_return_date: Option<NaiveDate>,
) -> AppResult<()> {
    if expected_return_date < borrow_date {
        return Err(AppError::InvalidDateRange(
            "Return date can't be less than borrow date".to_string(),
        ));
    }
    if let Some(actual) = actual_return_date {
        if actual < borrow_date {
            return Err(AppError::InvalidDateRange(
                "Actual return date can't be less than borrow date".to_string(),
            ));
        }
    }
    Ok(())
}

/// Borrowing with full details for display
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowingDetails {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub is_active: bool,
    pub book: Book,
    pub user: UserSummary,
}

/// Short borrowing representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowingSummary {
    pub id: i32,
    pub borrow_date: NaiveDate,
    pub expected_return_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub book_title: String,
    pub user_email: String,
}

/// Active borrowing due on or before the sweep threshold
#[derive(Debug, Clone, FromRow)]
pub struct OverdueBorrowing {
    pub id: i32,
    pub expected_return_date: NaiveDate,
    pub book_title: String,
    pub user_email: String,
}

/// Create borrowing request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBorrowing {
    pub book_id: i32,
    pub expected_return_date: NaiveDate,
}

/// Borrowing query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BorrowingQuery {
    /// Filter by user (honored for staff callers only)
    pub user_id: Option<i32>,
    /// Filter on open (`true`) or closed (`false`) borrowings
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_expected_return_on_or_after_borrow_date() {
        assert!(validate_dates(date(2024, 1, 10), date(2024, 1, 10), None).is_ok());
        assert!(validate_dates(date(2024, 1, 10), date(2024, 1, 24), None).is_ok());
    }

    #[test]
    fn rejects_expected_return_before_borrow_date() {
        let err = validate_dates(date(2024, 1, 10), date(2024, 1, 5), None).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn rejects_actual_return_before_borrow_date() {
        let err =
            validate_dates(date(2024, 1, 10), date(2024, 1, 20), Some(date(2024, 1, 9)))
                .unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn accepts_actual_return_on_borrow_date() {
        assert!(
            validate_dates(date(2024, 1, 10), date(2024, 1, 20), Some(date(2024, 1, 10)))
                .is_ok()
        );
    }

    #[test]
    fn is_active_tracks_actual_return_date() {
        let mut borrowing = Borrowing {
            id: 1,
            borrow_date: date(2024, 1, 10),
            expected_return_date: date(2024, 1, 24),
            actual_return_date: None,
            book_id: 1,
            user_id: 1,
        };
        assert!(borrowing.is_active());

        borrowing.actual_return_date = Some(date(2024, 1, 20));
        assert!(!borrowing.is_active());
    }
}
