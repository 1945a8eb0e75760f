//! Submission and revert: the transactional ends of the draft lifecycle.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::application::{NarrativeAnswer, SubmittedApplication};
use crate::domain::auth::Principal;
use crate::domain::convert;
use crate::domain::draft::ApplicationDraft;
use crate::domain::organization::OrganizationProfile;
use crate::domain::ports::{
    ApplicationRepository, ApplicationRepositoryError, CycleRepository, DraftRepository,
};
use crate::domain::Error;

use super::cycle_service::CycleService;
use super::draft_service::DraftService;

/// A submitted application with its ordered narrative answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationView {
    /// The typed application row.
    pub application: SubmittedApplication,
    /// One answer per cycle question, in cycle order.
    pub answers: Vec<NarrativeAnswer>,
}

/// Converts drafts into submissions and back.
#[derive(Clone)]
pub struct SubmissionService {
    drafts: Arc<dyn DraftRepository>,
    cycles: Arc<dyn CycleRepository>,
    applications: Arc<dyn ApplicationRepository>,
    clock: Arc<dyn Clock>,
}

impl SubmissionService {
    /// Create a new service over the given ports.
    pub fn new(
        drafts: Arc<dyn DraftRepository>,
        cycles: Arc<dyn CycleRepository>,
        applications: Arc<dyn ApplicationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            drafts,
            cycles,
            applications,
            clock,
        }
    }

    pub(crate) fn map_application_error(error: ApplicationRepositoryError) -> Error {
        match error {
            ApplicationRepositoryError::Connection { message } => Error::service_unavailable(
                format!("application repository unavailable: {message}"),
            ),
            ApplicationRepositoryError::Query { message } => {
                Error::internal(format!("application repository error: {message}"))
            }
            ApplicationRepositoryError::Duplicate { .. } => {
                Error::conflict("An application for this cycle has already been submitted")
            }
        }
    }

    /// Validate the draft and convert it into a submitted application.
    ///
    /// The write is one transaction: application and answers inserted, the
    /// draft deleted, and the organization profile refreshed when this is
    /// the organization's latest submission.
    pub async fn submit(
        &self,
        principal: &Principal,
        draft_id: Uuid,
    ) -> Result<SubmittedApplication, Error> {
        let draft = self
            .drafts
            .find(draft_id)
            .await
            .map_err(DraftService::map_draft_error)?
            .ok_or_else(|| Error::not_found("No such draft"))?;
        principal.require_organization_access(draft.organization_id)?;

        let detail = self
            .cycles
            .detail(draft.cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::internal("draft references a missing cycle"))?;

        let now = self.clock.utc();
        if !draft.editable(&detail.cycle, now) {
            return Err(Error::conflict("The application period has closed"));
        }

        let converted = convert::to_submission(&draft, &detail, now)?;
        let profile = OrganizationProfile::from_application(&converted.application);
        self.applications
            .submit(&converted, draft.id, &profile)
            .await
            .map_err(Self::map_application_error)?;
        info!(
            application_id = %converted.application.id,
            cycle_id = %converted.application.cycle_id,
            "application submitted"
        );
        Ok(converted.application)
    }

    /// A submitted application with its answers.
    pub async fn application(
        &self,
        principal: &Principal,
        application_id: Uuid,
    ) -> Result<ApplicationView, Error> {
        let application = self
            .applications
            .find(application_id)
            .await
            .map_err(Self::map_application_error)?
            .ok_or_else(|| Error::not_found("No such application"))?;
        principal.require_organization_access(application.organization_id)?;
        let answers = self
            .applications
            .answers(application_id)
            .await
            .map_err(Self::map_application_error)?;
        Ok(ApplicationView {
            application,
            answers,
        })
    }

    /// Staff-only: convert a submission back into a draft.
    ///
    /// The regenerated draft reproduces every non-file field, re-expands
    /// composite answers into their flat keys, and copies file references;
    /// the application and its answers are deleted in the same transaction.
    pub async fn revert(
        &self,
        principal: &Principal,
        application_id: Uuid,
    ) -> Result<ApplicationDraft, Error> {
        principal.require_staff()?;
        let view = self.application(principal, application_id).await?;
        let detail = self
            .cycles
            .detail(view.application.cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::internal("application references a missing cycle"))?;

        let draft = convert::to_draft(
            &view.application,
            &view.answers,
            &detail,
            self.clock.utc(),
        )?;
        self.applications
            .revert(application_id, &draft)
            .await
            .map_err(Self::map_application_error)?;
        info!(
            application_id = %application_id,
            draft_id = %draft.id,
            "application reverted to draft"
        );
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::{
        MockApplicationRepository, MockCycleRepository, MockDraftRepository,
    };
    use crate::test_support::clock::MutableClock;
    use crate::test_support::fixtures::{standard_cycle_detail, submission_ready_draft};
    use chrono::Utc;
    use rstest::rstest;

    fn service(
        drafts: MockDraftRepository,
        cycles: MockCycleRepository,
        applications: MockApplicationRepository,
    ) -> SubmissionService {
        SubmissionService::new(
            Arc::new(drafts),
            Arc::new(cycles),
            Arc::new(applications),
            Arc::new(MutableClock::new(Utc::now())),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn submit_converts_and_persists_atomically() {
        let detail = standard_cycle_detail();
        let organization_id = Uuid::new_v4();
        let draft = submission_ready_draft(organization_id, detail.cycle.id);
        let draft_id = draft.id;

        let mut drafts = MockDraftRepository::new();
        drafts.expect_find().return_once(move |_| Ok(Some(draft)));
        let mut cycles = MockCycleRepository::new();
        let detail_clone = detail.clone();
        cycles
            .expect_detail()
            .return_once(move |_| Ok(Some(detail_clone)));
        let mut applications = MockApplicationRepository::new();
        applications
            .expect_submit()
            .withf(move |converted, source_draft_id, profile| {
                converted.application.organization_id == organization_id
                    && *source_draft_id == draft_id
                    && profile.is_usable()
            })
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let service = service(drafts, cycles, applications);
        let principal = Principal::organization("org@example.org", organization_id);
        let application = service.submit(&principal, draft_id).await.expect("submit");
        assert_eq!(application.organization_id, organization_id);
    }

    #[rstest]
    #[tokio::test]
    async fn submit_surfaces_field_errors_without_writing() {
        let detail = standard_cycle_detail();
        let organization_id = Uuid::new_v4();
        let mut draft = submission_ready_draft(organization_id, detail.cycle.id);
        draft.contents.remove("mission");
        let draft_id = draft.id;

        let mut drafts = MockDraftRepository::new();
        drafts.expect_find().return_once(move |_| Ok(Some(draft)));
        let mut cycles = MockCycleRepository::new();
        cycles.expect_detail().return_once(move |_| Ok(Some(detail)));
        let mut applications = MockApplicationRepository::new();
        applications.expect_submit().times(0);

        let service = service(drafts, cycles, applications);
        let principal = Principal::organization("org@example.org", organization_id);
        let err = service
            .submit(&principal, draft_id)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_submission_maps_to_conflict() {
        let detail = standard_cycle_detail();
        let organization_id = Uuid::new_v4();
        let draft = submission_ready_draft(organization_id, detail.cycle.id);
        let draft_id = draft.id;

        let mut drafts = MockDraftRepository::new();
        drafts.expect_find().return_once(move |_| Ok(Some(draft)));
        let mut cycles = MockCycleRepository::new();
        cycles.expect_detail().return_once(move |_| Ok(Some(detail)));
        let mut applications = MockApplicationRepository::new();
        applications.expect_submit().return_once(|_, _, _| {
            Err(ApplicationRepositoryError::duplicate(
                "organization/cycle pair taken",
            ))
        });

        let service = service(drafts, cycles, applications);
        let principal = Principal::organization("org@example.org", organization_id);
        let err = service
            .submit(&principal, draft_id)
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn revert_requires_staff() {
        let service = service(
            MockDraftRepository::new(),
            MockCycleRepository::new(),
            MockApplicationRepository::new(),
        );
        let principal = Principal::organization("org@example.org", Uuid::new_v4());
        let err = service
            .revert(&principal, Uuid::new_v4())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn revert_round_trips_the_draft_contents() {
        let detail = standard_cycle_detail();
        let organization_id = Uuid::new_v4();
        let draft = submission_ready_draft(organization_id, detail.cycle.id);
        let converted =
            convert::to_submission(&draft, &detail, Utc::now()).expect("fixture converts");
        let application = converted.application.clone();
        let application_id = application.id;
        let answers = converted.answers.clone();

        let mut cycles = MockCycleRepository::new();
        let detail_clone = detail.clone();
        cycles
            .expect_detail()
            .return_once(move |_| Ok(Some(detail_clone)));
        let mut applications = MockApplicationRepository::new();
        applications
            .expect_find()
            .return_once(move |_| Ok(Some(application)));
        applications
            .expect_answers()
            .return_once(move |_| Ok(answers));
        applications
            .expect_revert()
            .times(1)
            .return_once(|_, _| Ok(()));

        let service = service(MockDraftRepository::new(), cycles, applications);
        let reverted = service
            .revert(&Principal::staff("admin"), application_id)
            .await
            .expect("revert");
        for (field, value) in &draft.contents {
            assert_eq!(reverted.field(field), value, "field {field} survives");
        }
        assert_eq!(reverted.files, draft.files);
    }
}
