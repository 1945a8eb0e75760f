//! Hand-rolled port doubles serving fixed data to the behavioural suites.
//!
//! Integration tests run outside the library crate, so the mockall mocks
//! are not available here. These stubs hold their data up front and answer
//! queries from it; the draft stub additionally honours the upsert
//! semantics the services rely on.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use backend::domain::application::{NarrativeAnswer, SubmittedApplication};
use backend::domain::award::Award;
use backend::domain::convert::ConvertedSubmission;
use backend::domain::cycle::{
    CycleDetail, CycleQuestion, CycleReportQuestion, CycleType, GrantCycle,
};
use backend::domain::draft::ApplicationDraft;
use backend::domain::organization::{Organization, OrganizationProfile};
use backend::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, AwardRepository, AwardRepositoryError,
    CycleRepository, CycleRepositoryError, DraftRepository, DraftRepositoryError,
    OrganizationRepository, OrganizationRepositoryError, ReportRepository, ReportRepositoryError,
};
use backend::domain::report::{GranteeReport, ReportAnswer, ReportDraft};

/// Cycle repository answering from a fixed cycle list and one detail.
pub(crate) struct StubCycleRepository {
    cycles: Vec<GrantCycle>,
    detail: Option<CycleDetail>,
}

impl StubCycleRepository {
    pub(crate) fn new(cycles: Vec<GrantCycle>, detail: Option<CycleDetail>) -> Self {
        Self { cycles, detail }
    }
}

#[async_trait]
impl CycleRepository for StubCycleRepository {
    async fn find(&self, cycle_id: Uuid) -> Result<Option<GrantCycle>, CycleRepositoryError> {
        Ok(self.cycles.iter().find(|c| c.id == cycle_id).cloned())
    }

    async fn list_open(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError> {
        Ok(self
            .cycles
            .iter()
            .filter(|c| c.is_open(now) && !c.private)
            .cloned()
            .collect())
    }

    async fn detail(&self, cycle_id: Uuid) -> Result<Option<CycleDetail>, CycleRepositoryError> {
        Ok(self
            .detail
            .clone()
            .filter(|detail| detail.cycle.id == cycle_id))
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

/// In-memory draft repository with whole-row upsert semantics.
pub(crate) struct StubDraftRepository {
    drafts: Mutex<Vec<ApplicationDraft>>,
}

impl StubDraftRepository {
    pub(crate) fn new(drafts: Vec<ApplicationDraft>) -> Self {
        Self {
            drafts: Mutex::new(drafts),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<ApplicationDraft>>, DraftRepositoryError>
    {
        self.drafts
            .lock()
            .map_err(|_| DraftRepositoryError::connection("draft stub poisoned"))
    }
}

#[async_trait]
impl DraftRepository for StubDraftRepository {
    async fn find(&self, draft_id: Uuid) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        Ok(self.lock()?.iter().find(|d| d.id == draft_id).cloned())
    }

    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .find(|d| d.organization_id == organization_id && d.cycle_id == cycle_id)
            .cloned())
    }

    async fn list_for_cycle(
        &self,
        cycle_id: Uuid,
    ) -> Result<Vec<ApplicationDraft>, DraftRepositoryError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|d| d.cycle_id == cycle_id)
            .cloned()
            .collect())
    }

    async fn save(&self, draft: &ApplicationDraft) -> Result<(), DraftRepositoryError> {
        let mut drafts = self.lock()?;
        if let Some(existing) = drafts.iter_mut().find(|d| d.id == draft.id) {
            *existing = draft.clone();
        } else {
            drafts.push(draft.clone());
        }
        Ok(())
    }

    async fn delete(&self, draft_id: Uuid) -> Result<(), DraftRepositoryError> {
        self.lock()?.retain(|d| d.id != draft_id);
        Ok(())
    }

    async fn reassign_cycle(
        &self,
        from_cycle_id: Uuid,
        to_cycle_id: Uuid,
    ) -> Result<u64, DraftRepositoryError> {
        let mut moved = 0_u64;
        for draft in self.lock()?.iter_mut() {
            if draft.cycle_id == from_cycle_id {
                draft.cycle_id = to_cycle_id;
                moved += 1;
            }
        }
        Ok(moved)
    }
}

/// Application repository answering reads from a fixed list.
pub(crate) struct StubApplicationRepository {
    applications: Vec<SubmittedApplication>,
}

impl StubApplicationRepository {
    pub(crate) fn new(applications: Vec<SubmittedApplication>) -> Self {
        Self { applications }
    }
}

#[async_trait]
impl ApplicationRepository for StubApplicationRepository {
    async fn find(
        &self,
        application_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        Ok(self
            .applications
            .iter()
            .find(|a| a.id == application_id)
            .cloned())
    }

    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        Ok(self
            .applications
            .iter()
            .find(|a| a.organization_id == organization_id && a.cycle_id == cycle_id)
            .cloned())
    }

    async fn answers(
        &self,
        _application_id: Uuid,
    ) -> Result<Vec<NarrativeAnswer>, ApplicationRepositoryError> {
        Ok(Vec::new())
    }

    async fn submit(
        &self,
        _submission: &ConvertedSubmission,
        _draft_id: Uuid,
        _profile: &OrganizationProfile,
    ) -> Result<(), ApplicationRepositoryError> {
        Ok(())
    }

    async fn revert(
        &self,
        _application_id: Uuid,
        _draft: &ApplicationDraft,
    ) -> Result<(), ApplicationRepositoryError> {
        Ok(())
    }
}

/// Award repository answering from a fixed list.
pub(crate) struct StubAwardRepository {
    awards: Vec<Award>,
}

impl StubAwardRepository {
    pub(crate) fn new(awards: Vec<Award>) -> Self {
        Self { awards }
    }
}

#[async_trait]
impl AwardRepository for StubAwardRepository {
    async fn find(&self, award_id: Uuid) -> Result<Option<Award>, AwardRepositoryError> {
        Ok(self.awards.iter().find(|a| a.id == award_id).cloned())
    }

    async fn find_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Award>, AwardRepositoryError> {
        Ok(self
            .awards
            .iter()
            .find(|a| a.application_id == application_id)
            .cloned())
    }

    async fn create(&self, _award: &Award) -> Result<(), AwardRepositoryError> {
        Ok(())
    }

    async fn list_with_report_due_on(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<Award>, AwardRepositoryError> {
        Ok(self
            .awards
            .iter()
            .filter(|a| {
                dates.contains(&a.first_report_due)
                    || a.second_report_due.is_some_and(|due| dates.contains(&due))
            })
            .cloned()
            .collect())
    }
}

/// Report repository reporting a fixed submitted count for every award.
pub(crate) struct StubReportRepository {
    submitted: u32,
}

impl StubReportRepository {
    pub(crate) fn new(submitted: u32) -> Self {
        Self { submitted }
    }
}

#[async_trait]
impl ReportRepository for StubReportRepository {
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
        Ok(self.submitted)
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

/// Organization repository answering from a fixed list.
pub(crate) struct StubOrganizationRepository {
    organizations: Vec<Organization>,
}

impl StubOrganizationRepository {
    pub(crate) fn new(organizations: Vec<Organization>) -> Self {
        Self { organizations }
    }
}

#[async_trait]
impl OrganizationRepository for StubOrganizationRepository {
    async fn find(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        Ok(self
            .organizations
            .iter()
            .find(|o| o.id == organization_id)
            .cloned())
    }
}
