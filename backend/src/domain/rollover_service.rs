//! Rollover: carry application content into a later cycle.
//!
//! The copy is content-level, not question-level: answers keyed to
//! questions the target cycle does not carry stay in the new draft's
//! contents and simply never render, so nothing is lost and nothing
//! breaks when question sets differ between cycles.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::auth::Principal;
use crate::domain::convert;
use crate::domain::cycle::GrantCycle;
use crate::domain::draft::ApplicationDraft;
use crate::domain::ports::{ApplicationRepository, CycleRepository, DraftRepository};
use crate::domain::validation::FieldErrors;
use crate::domain::Error;

use super::cycle_service::CycleService;
use super::draft_service::DraftService;
use super::submission_service::SubmissionService;

/// What to roll over: exactly one of a draft or a submitted application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverRequest {
    /// Source draft, exclusive with `application_id`.
    pub draft_id: Option<Uuid>,
    /// Source application, exclusive with `draft_id`.
    pub application_id: Option<Uuid>,
    /// Cycle the copy lands in.
    pub target_cycle_id: Uuid,
}

/// Copies drafts and submissions into another cycle.
#[derive(Clone)]
pub struct RolloverService {
    drafts: Arc<dyn DraftRepository>,
    cycles: Arc<dyn CycleRepository>,
    applications: Arc<dyn ApplicationRepository>,
    clock: Arc<dyn Clock>,
}

impl RolloverService {
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

    /// Self-service rollover: the target must be open for applications.
    pub async fn rollover(
        &self,
        principal: &Principal,
        request: RolloverRequest,
    ) -> Result<ApplicationDraft, Error> {
        let target = self.target_cycle(request.target_cycle_id).await?;
        if !target.is_open(self.clock.utc()) {
            let mut errors = FieldErrors::new();
            errors.insert("targetCycleId", "The target cycle is not open.");
            errors.into_result()?;
        }
        self.perform(principal, request, &target, None).await
    }

    /// Staff rollover: may target a closed cycle, but the source and
    /// target must share a cycle type.
    pub async fn rollover_as_staff(
        &self,
        principal: &Principal,
        request: RolloverRequest,
    ) -> Result<ApplicationDraft, Error> {
        principal.require_staff()?;
        let target = self.target_cycle(request.target_cycle_id).await?;
        self.perform(principal, request, &target, Some(target.cycle_type))
            .await
    }

    async fn target_cycle(&self, cycle_id: Uuid) -> Result<GrantCycle, Error> {
        self.cycles
            .find(cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::not_found("No such cycle"))
    }

    async fn perform(
        &self,
        principal: &Principal,
        request: RolloverRequest,
        target: &GrantCycle,
        required_type: Option<crate::domain::cycle::CycleType>,
    ) -> Result<ApplicationDraft, Error> {
        let (organization_id, source_cycle_id, contents, files) =
            match (request.draft_id, request.application_id) {
                (Some(draft_id), None) => {
                    let draft = self
                        .drafts
                        .find(draft_id)
                        .await
                        .map_err(DraftService::map_draft_error)?
                        .ok_or_else(|| Error::not_found("No such draft"))?;
                    principal.require_organization_access(draft.organization_id)?;
                    (
                        draft.organization_id,
                        draft.cycle_id,
                        draft.contents,
                        draft.files,
                    )
                }
                (None, Some(application_id)) => {
                    let application = self
                        .applications
                        .find(application_id)
                        .await
                        .map_err(SubmissionService::map_application_error)?
                        .ok_or_else(|| Error::not_found("No such application"))?;
                    principal.require_organization_access(application.organization_id)?;
                    let answers = self
                        .applications
                        .answers(application_id)
                        .await
                        .map_err(SubmissionService::map_application_error)?;
                    let detail = self
                        .cycles
                        .detail(application.cycle_id)
                        .await
                        .map_err(CycleService::map_cycle_error)?
                        .ok_or_else(|| Error::internal("application references a missing cycle"))?;
                    let draft =
                        convert::to_draft(&application, &answers, &detail, self.clock.utc())?;
                    (
                        application.organization_id,
                        application.cycle_id,
                        draft.contents,
                        draft.files,
                    )
                }
                _ => {
                    return Err(Error::invalid_request(
                        "Provide exactly one of a draft id or an application id",
                    ));
                }
            };

        if let Some(required) = required_type {
            let source = self
                .cycles
                .find(source_cycle_id)
                .await
                .map_err(CycleService::map_cycle_error)?
                .ok_or_else(|| Error::internal("source references a missing cycle"))?;
            if source.cycle_type != required {
                let mut errors = FieldErrors::new();
                errors.insert(
                    "targetCycleId",
                    "The source and target cycles must share a type.",
                );
                errors.into_result()?;
            }
        }

        self.reject_existing_target_records(organization_id, target.id)
            .await?;

        let now = self.clock.utc();
        let draft = ApplicationDraft::builder(organization_id, target.id)
            .created(now)
            .modified(now)
            .contents(contents)
            .files(files)
            .build();
        self.drafts
            .save(&draft)
            .await
            .map_err(DraftService::map_draft_error)?;
        info!(
            draft_id = %draft.id,
            target_cycle_id = %target.id,
            "rollover draft created"
        );
        Ok(draft)
    }

    async fn reject_existing_target_records(
        &self,
        organization_id: Uuid,
        target_cycle_id: Uuid,
    ) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        if self
            .drafts
            .find_for(organization_id, target_cycle_id)
            .await
            .map_err(DraftService::map_draft_error)?
            .is_some()
        {
            errors.insert(
                "targetCycleId",
                "A draft already exists for the target cycle.",
            );
        }
        if self
            .applications
            .find_for(organization_id, target_cycle_id)
            .await
            .map_err(SubmissionService::map_application_error)?
            .is_some()
        {
            errors.insert(
                "targetCycleId",
                "An application has already been submitted to the target cycle.",
            );
        }
        errors.into_result()
    }
}
