//! Grantee report lifecycle: get-or-create of the next scheduled report
//! draft, autosave, file attachment, and submission.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::attachments;
use crate::domain::auth::Principal;
use crate::domain::award::Award;
use crate::domain::cycle::AssembledReportQuestion;
use crate::domain::draft::STALENESS_WINDOW_SECONDS;
use crate::domain::ports::{
    ApplicationRepository, AwardRepository, BlobStore, BlobStoreError, CycleRepository,
    ReportRepository,
};
use crate::domain::question::ReportInputType;
use crate::domain::report::{GranteeReport, ReportAnswer, ReportDraft};
use crate::domain::validation;
use crate::domain::Error;

use super::award_service::AwardService;
use super::cycle_service::CycleService;
use super::submission_service::SubmissionService;

/// The report form model: the next report draft plus the cycle's report
/// questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportForm {
    /// The award the report covers.
    pub award: Award,
    /// The draft for the next scheduled report.
    pub draft: ReportDraft,
    /// The cycle's report questions, in form order.
    pub questions: Vec<AssembledReportQuestion>,
    /// When the report falls due.
    pub due_date: Option<NaiveDate>,
    /// Whether this request created the draft.
    pub created: bool,
}

/// A report draft with the rows needed to authorize and submit it.
struct ReportContext {
    draft: ReportDraft,
    award: Award,
    cycle_id: Uuid,
}

/// Report draft reads and writes on behalf of an authenticated principal.
#[derive(Clone)]
pub struct ReportService {
    awards: Arc<dyn AwardRepository>,
    applications: Arc<dyn ApplicationRepository>,
    cycles: Arc<dyn CycleRepository>,
    reports: Arc<dyn ReportRepository>,
    blobs: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    /// Create a new service over the given ports.
    pub fn new(
        awards: Arc<dyn AwardRepository>,
        applications: Arc<dyn ApplicationRepository>,
        cycles: Arc<dyn CycleRepository>,
        reports: Arc<dyn ReportRepository>,
        blobs: Arc<dyn BlobStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            awards,
            applications,
            cycles,
            reports,
            blobs,
            clock,
        }
    }

    fn map_blob_error(error: BlobStoreError) -> Error {
        match error {
            BlobStoreError::Storage { message } => {
                Error::service_unavailable(format!("blob store unavailable: {message}"))
            }
        }
    }

    /// The draft for the award's next scheduled report, created when
    /// absent; conflict once every owed report has been filed.
    pub async fn get_or_create(
        &self,
        principal: &Principal,
        award_id: Uuid,
    ) -> Result<ReportForm, Error> {
        let (award, cycle_id) = self.accessible_award(principal, award_id).await?;
        let reports_submitted = self
            .reports
            .count_submitted(award.id)
            .await
            .map_err(AwardService::map_report_error)?;
        let report_number = award
            .next_report_number(reports_submitted)
            .ok_or_else(|| Error::conflict("Every report for this grant has been submitted"))?;

        let questions = self.report_questions(cycle_id).await?;
        if let Some(draft) = self
            .reports
            .find_draft_for(award.id, report_number)
            .await
            .map_err(AwardService::map_report_error)?
        {
            let due_date = draft.due_date(&award);
            return Ok(ReportForm {
                award,
                draft,
                questions,
                due_date,
                created: false,
            });
        }

        let draft = ReportDraft::new(award.id, report_number, self.clock.utc());
        self.reports
            .save_draft(&draft)
            .await
            .map_err(AwardService::map_report_error)?;
        info!(
            draft_id = %draft.id,
            award_id = %award.id,
            report_number,
            "report draft created"
        );
        let due_date = draft.due_date(&award);
        Ok(ReportForm {
            award,
            draft,
            questions,
            due_date,
            created: true,
        })
    }

    /// Autosave the whole contents map, honouring the staleness protocol.
    pub async fn autosave(
        &self,
        principal: &Principal,
        draft_id: Uuid,
        contents: BTreeMap<String, String>,
        force: bool,
    ) -> Result<ReportDraft, Error> {
        let mut context = self.owned_draft(principal, draft_id).await?;
        let now = self.clock.utc();

        if !force && context.draft.conflicts_with(&principal.identity, now) {
            return Err(Error::conflict("Another editor saved this report just now")
                .with_details(json!({
                    "modifiedBy": context.draft.modified_by,
                    "modified": context.draft.modified,
                    "stalenessWindowSeconds": STALENESS_WINDOW_SECONDS,
                })));
        }

        context.draft.contents = contents;
        context.draft.modified = now;
        context.draft.modified_by = Some(principal.identity.clone());
        self.reports
            .save_draft(&context.draft)
            .await
            .map_err(AwardService::map_report_error)?;
        Ok(context.draft)
    }

    /// Store an upload against a file or photo question on the report.
    pub async fn attach_file(
        &self,
        principal: &Principal,
        draft_id: Uuid,
        question_name: &str,
        filename: &str,
        bytes: &[u8],
    ) -> Result<ReportDraft, Error> {
        let mut context = self.owned_draft(principal, draft_id).await?;
        let questions = self.report_questions(context.cycle_id).await?;
        let question = questions
            .iter()
            .map(|assembled| &assembled.question)
            .find(|question| question.name == question_name)
            .ok_or_else(|| Error::not_found("No such report question"))?;

        let outcome = match question.input_type {
            ReportInputType::Photo => attachments::validate_photo(filename),
            ReportInputType::File => attachments::validate(filename),
            ReportInputType::Text | ReportInputType::Number => {
                return Err(Error::invalid_request(
                    "This question does not take a file upload",
                ));
            }
        };
        outcome.map_err(|problem| {
            Error::invalid_request("Validation failed")
                .with_details(json!({ "fields": { question_name: problem.to_string() } }))
        })?;

        let reference = self
            .blobs
            .store(
                &format!("reports/{draft_id}/{question_name}"),
                filename,
                bytes,
            )
            .await
            .map_err(Self::map_blob_error)?;
        if let Some(previous) = context
            .draft
            .files
            .insert(question_name.to_owned(), reference)
        {
            self.discard_blob(&previous).await;
        }
        context.draft.modified = self.clock.utc();
        context.draft.modified_by = Some(principal.identity.clone());
        self.reports
            .save_draft(&context.draft)
            .await
            .map_err(AwardService::map_report_error)?;
        Ok(context.draft)
    }

    /// Validate the draft and convert it into a submitted report.
    ///
    /// The write is one transaction: report and answers inserted, the
    /// draft deleted.
    pub async fn submit(
        &self,
        principal: &Principal,
        draft_id: Uuid,
    ) -> Result<GranteeReport, Error> {
        let context = self.owned_draft(principal, draft_id).await?;
        let reports_submitted = self
            .reports
            .count_submitted(context.award.id)
            .await
            .map_err(AwardService::map_report_error)?;
        if reports_submitted >= context.award.grant_length() {
            return Err(Error::conflict(
                "Every report for this grant has been submitted",
            ));
        }

        let questions = self.report_questions(context.cycle_id).await?;
        validation::validate_report(&context.draft.contents, &context.draft.files, &questions)
            .into_result()?;

        let report = GranteeReport {
            id: Uuid::new_v4(),
            award_id: context.award.id,
            report_number: context.draft.report_number,
            submitted: self.clock.utc(),
        };
        let answers: Vec<ReportAnswer> = questions
            .iter()
            .map(|assembled| {
                let name = assembled.question.name.as_str();
                let text = match assembled.question.input_type {
                    ReportInputType::Text | ReportInputType::Number => {
                        context.draft.field(name).to_owned()
                    }
                    ReportInputType::File | ReportInputType::Photo => context
                        .draft
                        .files
                        .get(name)
                        .cloned()
                        .unwrap_or_default(),
                };
                ReportAnswer {
                    id: Uuid::new_v4(),
                    grantee_report_id: report.id,
                    cycle_report_question_id: assembled.cycle_report_question_id,
                    text,
                }
            })
            .collect();
        self.reports
            .submit(&report, &answers, context.draft.id)
            .await
            .map_err(AwardService::map_report_error)?;
        info!(
            report_id = %report.id,
            award_id = %report.award_id,
            report_number = report.report_number,
            "report submitted"
        );
        Ok(report)
    }

    /// Find the award and check the caller may see it.
    async fn accessible_award(
        &self,
        principal: &Principal,
        award_id: Uuid,
    ) -> Result<(Award, Uuid), Error> {
        let award = self
            .awards
            .find(award_id)
            .await
            .map_err(AwardService::map_award_error)?
            .ok_or_else(|| Error::not_found("No such award"))?;
        let application = self
            .applications
            .find(award.application_id)
            .await
            .map_err(SubmissionService::map_application_error)?
            .ok_or_else(|| Error::internal("award references a missing application"))?;
        principal.require_organization_access(application.organization_id)?;
        Ok((award, application.cycle_id))
    }

    async fn owned_draft(
        &self,
        principal: &Principal,
        draft_id: Uuid,
    ) -> Result<ReportContext, Error> {
        let draft = self
            .reports
            .find_draft(draft_id)
            .await
            .map_err(AwardService::map_report_error)?
            .ok_or_else(|| Error::not_found("No such report draft"))?;
        let (award, cycle_id) = self.accessible_award(principal, draft.award_id).await?;
        Ok(ReportContext {
            draft,
            award,
            cycle_id,
        })
    }

    async fn report_questions(
        &self,
        cycle_id: Uuid,
    ) -> Result<Vec<AssembledReportQuestion>, Error> {
        let detail = self
            .cycles
            .detail(cycle_id)
            .await
            .map_err(CycleService::map_cycle_error)?
            .ok_or_else(|| Error::internal("award references a missing cycle"))?;
        Ok(detail.report_questions)
    }

    /// Blob removal is best-effort: the reference is already gone from the
    /// draft, so a failed delete only leaks storage.
    async fn discard_blob(&self, reference: &str) {
        if let Err(error) = self.blobs.remove(reference).await {
            warn!(%reference, %error, "failed to remove blob");
        }
    }
}
