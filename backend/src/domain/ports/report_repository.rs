//! Port for grantee reports and report drafts.
//!
//! Report submission mirrors application submission: the adapter writes
//! the report with its answers and deletes the draft in one transaction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::report::{GranteeReport, ReportAnswer, ReportDraft};

use super::define_port_error;

define_port_error! {
    /// Errors raised by report repository adapters.
    pub enum ReportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "report repository query failed: {message}",
        /// A report for this `(award, report_number)` already exists.
        Duplicate { message: String } =>
            "report already exists: {message}",
    }
}

/// Port for report drafts and submitted report rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Find a report draft by id.
    async fn find_draft(
        &self,
        draft_id: Uuid,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError>;

    /// Find the draft for an award's numbered report slot, if any.
    async fn find_draft_for(
        &self,
        award_id: Uuid,
        report_number: u32,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError>;

    /// Insert or replace the whole report draft row.
    async fn save_draft(&self, draft: &ReportDraft) -> Result<(), ReportRepositoryError>;

    /// How many reports the award's grantee has submitted.
    async fn count_submitted(&self, award_id: Uuid) -> Result<u32, ReportRepositoryError>;

    /// Atomically insert the report with its answers and delete the draft.
    async fn submit(
        &self,
        report: &GranteeReport,
        answers: &[ReportAnswer],
        draft_id: Uuid,
    ) -> Result<(), ReportRepositoryError>;
}

/// Fixture implementation for tests that do not exercise reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportRepository;

#[async_trait]
impl ReportRepository for FixtureReportRepository {
    async fn find_draft(
        &self,
        _draft_id: Uuid,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError> {
        Ok(None)
    }

    async fn find_draft_for(
        &self,
        _award_id: Uuid,
        _report_number: u32,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError> {
        Ok(None)
    }

    async fn save_draft(&self, _draft: &ReportDraft) -> Result<(), ReportRepositoryError> {
        Ok(())
    }

    async fn count_submitted(&self, _award_id: Uuid) -> Result<u32, ReportRepositoryError> {
        Ok(0)
    }

    async fn submit(
        &self,
        _report: &GranteeReport,
        _answers: &[ReportAnswer],
        _draft_id: Uuid,
    ) -> Result<(), ReportRepositoryError> {
        Ok(())
    }
}
