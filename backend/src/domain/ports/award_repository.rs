//! Port for award persistence and reminder-date lookups.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::award::Award;

use super::define_port_error;

define_port_error! {
    /// Errors raised by award repository adapters.
    pub enum AwardRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "award repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "award repository query failed: {message}",
        /// The application already carries an award.
        Duplicate { message: String } =>
            "award already exists: {message}",
    }
}

/// Port for award rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AwardRepository: Send + Sync {
    /// Find an award by id.
    async fn find(&self, award_id: Uuid) -> Result<Option<Award>, AwardRepositoryError>;

    /// Find the award funding an application, if any.
    async fn find_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Award>, AwardRepositoryError>;

    /// Persist a new award.
    async fn create(&self, award: &Award) -> Result<(), AwardRepositoryError>;

    /// Awards whose first or second report falls due on any of `dates`.
    async fn list_with_report_due_on(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<Award>, AwardRepositoryError>;
}

/// Fixture implementation for tests that do not exercise awards.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAwardRepository;

#[async_trait]
impl AwardRepository for FixtureAwardRepository {
    async fn find(&self, _award_id: Uuid) -> Result<Option<Award>, AwardRepositoryError> {
        Ok(None)
    }

    async fn find_for_application(
        &self,
        _application_id: Uuid,
    ) -> Result<Option<Award>, AwardRepositoryError> {
        Ok(None)
    }

    async fn create(&self, _award: &Award) -> Result<(), AwardRepositoryError> {
        Ok(())
    }

    async fn list_with_report_due_on(
        &self,
        _dates: &[NaiveDate],
    ) -> Result<Vec<Award>, AwardRepositoryError> {
        Ok(Vec::new())
    }
}
