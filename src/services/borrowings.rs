//! Borrowing workflow service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        borrowing::{BorrowingDetails, BorrowingQuery, BorrowingSummary, CreateBorrowing},
        user::UserClaims,
    },
    repository::{borrowings::BorrowingScope, Repository},
    services::notifier::Notifier,
};

#[derive(Clone)]
pub struct BorrowingsService {
    repository: Repository,
    notifier: Arc<dyn Notifier>,
}

impl BorrowingsService {
    pub fn new(repository: Repository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    fn scope_for(claims: &UserClaims) -> BorrowingScope {
        if claims.is_staff {
            BorrowingScope::All
        } else {
            BorrowingScope::User(claims.user_id)
        }
    }

    /// Borrow a book for the authenticated user.
    ///
    /// The inventory decrement and the borrowing insert commit as one
    /// transaction in the repository; the loan notification is sent after
    /// the commit on a detached task so its outcome never affects the
    /// caller's result.
    pub async fn create_borrowing(
        &self,
        claims: &UserClaims,
        request: &CreateBorrowing,
    ) -> AppResult<BorrowingDetails> {
        let details = self
            .repository
            .borrowings
            .create(claims.user_id, request.book_id, request.expected_return_date)
            .await?;

        let text = format!(
            "{} borrowed {}, {} till {}",
            details.user.email,
            details.book.title,
            details.book.author,
            details.expected_return_date
        );
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&text).await {
                tracing::warn!("Failed to send borrow notification: {}", e);
            }
        });

        Ok(details)
    }

    /// Return a borrowed book.
    ///
    /// Regular users can only return their own borrowings; anything else
    /// surfaces as not found, matching the visibility of the listing.
    pub async fn return_borrowing(
        &self,
        claims: &UserClaims,
        borrowing_id: i32,
    ) -> AppResult<BorrowingDetails> {
        // Visibility check before mutating anything
        self.repository
            .borrowings
            .get_details(borrowing_id, Self::scope_for(claims))
            .await?;

        self.repository.borrowings.return_borrowing(borrowing_id).await
    }

    /// Get borrowing details visible to the caller
    pub async fn get_borrowing(
        &self,
        claims: &UserClaims,
        borrowing_id: i32,
    ) -> AppResult<BorrowingDetails> {
        self.repository
            .borrowings
            .get_details(borrowing_id, Self::scope_for(claims))
            .await
    }

    /// List borrowings visible to the caller
    pub async fn list_borrowings(
        &self,
        claims: &UserClaims,
        query: &BorrowingQuery,
    ) -> AppResult<(Vec<BorrowingSummary>, i64)> {
        self.repository
            .borrowings
            .list(query, Self::scope_for(claims))
            .await
    }
}
