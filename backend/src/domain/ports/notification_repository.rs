//! Port for the notification ledger.
//!
//! Records land here only after a send succeeds, so a failed send is
//! retried by the next day's run while a successful one is never
//! repeated.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::jobs::{NotificationKind, NotificationRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification ledger adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "notification ledger query failed: {message}",
    }
}

/// Port for checking and recording sent notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Whether a notification keyed `(recipient, kind, due_date)` was
    /// already sent.
    async fn was_sent(
        &self,
        recipient: &str,
        kind: NotificationKind,
        due_date: NaiveDate,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Record a successful send.
    async fn record(&self, record: &NotificationRecord)
    -> Result<(), NotificationRepositoryError>;
}

/// Fixture implementation: nothing has ever been sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureNotificationRepository;

#[async_trait]
impl NotificationRepository for FixtureNotificationRepository {
    async fn was_sent(
        &self,
        _recipient: &str,
        _kind: NotificationKind,
        _due_date: NaiveDate,
    ) -> Result<bool, NotificationRepositoryError> {
        Ok(false)
    }

    async fn record(
        &self,
        _record: &NotificationRecord,
    ) -> Result<(), NotificationRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_nothing_sent() {
        let repo = FixtureNotificationRepository;
        let sent = repo
            .was_sent(
                "org@example.org",
                NotificationKind::DraftWarning,
                Utc::now().date_naive(),
            )
            .await
            .expect("was_sent");
        assert!(!sent);
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = NotificationRepositoryError::connection("timed out");
        assert!(err.to_string().contains("timed out"));
    }
}
