//! Port for grant cycle persistence and question assembly reads.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::cycle::{CycleDetail, CycleQuestion, CycleReportQuestion, CycleType, GrantCycle};

use super::define_port_error;

define_port_error! {
    /// Errors raised by cycle repository adapters.
    pub enum CycleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "cycle repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "cycle repository query failed: {message}",
    }
}

/// Port for cycle rows and their assembled question sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CycleRepository: Send + Sync {
    /// Find a cycle by id.
    async fn find(&self, cycle_id: Uuid) -> Result<Option<GrantCycle>, CycleRepositoryError>;

    /// Cycles open at `now` that are not private, ordered by close time.
    async fn list_open(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError>;

    /// A cycle with its narrative and report questions in display order.
    async fn detail(&self, cycle_id: Uuid) -> Result<Option<CycleDetail>, CycleRepositoryError>;

    /// Persist a cycle together with its question joins, atomically.
    async fn create(
        &self,
        cycle: &GrantCycle,
        questions: &[CycleQuestion],
        report_questions: &[CycleReportQuestion],
    ) -> Result<(), CycleRepositoryError>;

    /// Cycles of recurring types whose close fell inside
    /// `(window_start, now]`.
    async fn list_recently_closed(
        &self,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError>;

    /// Whether any cycle of `cycle_type` still closes after `now`.
    async fn successor_exists(
        &self,
        cycle_type: CycleType,
        now: DateTime<Utc>,
    ) -> Result<bool, CycleRepositoryError>;
}

/// Fixture implementation for tests that do not exercise cycle persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCycleRepository;

#[async_trait]
impl CycleRepository for FixtureCycleRepository {
    async fn find(&self, _cycle_id: Uuid) -> Result<Option<GrantCycle>, CycleRepositoryError> {
        Ok(None)
    }

    async fn list_open(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError> {
        Ok(Vec::new())
    }

    async fn detail(&self, _cycle_id: Uuid) -> Result<Option<CycleDetail>, CycleRepositoryError> {
        Ok(None)
    }

    async fn create(
        &self,
        _cycle: &GrantCycle,
        _questions: &[CycleQuestion],
        _report_questions: &[CycleReportQuestion],
    ) -> Result<(), CycleRepositoryError> {
        Ok(())
    }

    async fn list_recently_closed(
        &self,
        _window_start: DateTime<Utc>,
        _now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError> {
        Ok(Vec::new())
    }

    async fn successor_exists(
        &self,
        _cycle_type: CycleType,
        _now: DateTime<Utc>,
    ) -> Result<bool, CycleRepositoryError> {
        Ok(false)
    }
}
