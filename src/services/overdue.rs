//! Overdue borrowings sweep

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::{
    error::AppResult,
    models::borrowing::OverdueBorrowing,
    repository::Repository,
    services::notifier::Notifier,
};

#[derive(Clone)]
pub struct OverdueService {
    repository: Repository,
    notifier: Arc<dyn Notifier>,
}

impl OverdueService {
    pub fn new(repository: Repository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Run one sweep over active borrowings due within a day or past due.
    ///
    /// Any error is caught here and reported through the notification
    /// channel itself; the scheduler loop never sees a failure.
    pub async fn run(&self) {
        if let Err(e) = self.sweep().await {
            tracing::error!("Overdue sweep failed: {}", e);
            let text = format!("Error in overdue borrowings check: {}", e);
            if let Err(notify_err) = self.notifier.notify(&text).await {
                tracing::warn!("Failed to report sweep error: {}", notify_err);
            }
        }
    }

    async fn sweep(&self) -> AppResult<()> {
        let today = Utc::now().date_naive();
        let threshold = today + Duration::days(1);

        let overdue = self.repository.borrowings.find_due_soon(threshold).await?;
        tracing::debug!("Overdue sweep found {} borrowing(s)", overdue.len());

        notify_overdue(self.notifier.as_ref(), &overdue).await
    }
}

/// Emit one notification per overdue borrowing, or a single "nothing
/// overdue" message when the sweep comes up empty.
pub(crate) async fn notify_overdue(
    notifier: &dyn Notifier,
    overdue: &[OverdueBorrowing],
) -> AppResult<()> {
    if overdue.is_empty() {
        notifier.notify("No borrowings overdue today.").await?;
        return Ok(());
    }

    for borrowing in overdue {
        let text = format!(
            "Borrowing #{} is overdue. Please return the book - {}.",
            borrowing.id, borrowing.book_title
        );
        notifier.notify(&text).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notifier::MockNotifier;
    use chrono::NaiveDate;

    fn overdue(id: i32, title: &str) -> OverdueBorrowing {
        OverdueBorrowing {
            id,
            expected_return_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            book_title: title.to_string(),
            user_email: "reader@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_sweep_emits_single_nothing_overdue_message() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| text == "No borrowings overdue today.")
            .times(1)
            .returning(|_| Ok(()));

        notify_overdue(&notifier, &[]).await.unwrap();
    }

    #[tokio::test]
    async fn emits_one_message_per_overdue_borrowing() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|text| text == "Borrowing #1 is overdue. Please return the book - Dune.")
            .times(1)
            .returning(|_| Ok(()));
        notifier
            .expect_notify()
            .withf(|text| {
                text == "Borrowing #2 is overdue. Please return the book - Neuromancer."
            })
            .times(1)
            .returning(|_| Ok(()));

        notify_overdue(&notifier, &[overdue(1, "Dune"), overdue(2, "Neuromancer")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn notification_failure_propagates_to_caller() {
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .times(1)
            .returning(|_| Err(crate::error::AppError::Notification("boom".to_string())));

        let result = notify_overdue(&notifier, &[overdue(1, "Dune")]).await;
        assert!(result.is_err());
    }
}
