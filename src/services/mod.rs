//! Business logic services

pub mod borrowings;
pub mod catalog;
pub mod notifier;
pub mod overdue;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, TelegramConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub borrowings: borrowings::BorrowingsService,
    pub overdue: overdue::OverdueService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        telegram_config: TelegramConfig,
    ) -> Self {
        let notifier: Arc<dyn notifier::Notifier> =
            Arc::new(notifier::TelegramNotifier::new(telegram_config));

        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            borrowings: borrowings::BorrowingsService::new(
                repository.clone(),
                Arc::clone(&notifier),
            ),
            overdue: overdue::OverdueService::new(repository, notifier),
        }
    }
}
