//! Port for the durable job run ledger.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::jobs::{JobKind, JobRun};

use super::define_port_error;

define_port_error! {
    /// Errors raised by job run ledger adapters.
    pub enum JobRunRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "job run ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "job run ledger query failed: {message}",
    }
}

/// Port for recording and checking daily job runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRunRepository: Send + Sync {
    /// The run recorded for `(kind, run_date)`, if the job already ran.
    async fn find_run(
        &self,
        kind: JobKind,
        run_date: NaiveDate,
    ) -> Result<Option<JobRun>, JobRunRepositoryError>;

    /// Record a completed run.
    async fn record(&self, run: &JobRun) -> Result<(), JobRunRepositoryError>;
}

/// Fixture implementation: no runs recorded, every day is fresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJobRunRepository;

#[async_trait]
impl JobRunRepository for FixtureJobRunRepository {
    async fn find_run(
        &self,
        _kind: JobKind,
        _run_date: NaiveDate,
    ) -> Result<Option<JobRun>, JobRunRepositoryError> {
        Ok(None)
    }

    async fn record(&self, _run: &JobRun) -> Result<(), JobRunRepositoryError> {
        Ok(())
    }
}
