//! Awards: staff-created grants and their report schedule state.

use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use tracing::info;
use uuid::Uuid;

use crate::domain::auth::Principal;
use crate::domain::award::Award;
use crate::domain::ports::{
    ApplicationRepository, AwardRepository, AwardRepositoryError, ReportRepository,
    ReportRepositoryError,
};
use crate::domain::validation::FieldErrors;
use crate::domain::Error;

use super::submission_service::SubmissionService;

/// Staff input for creating an award against an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAwardRequest {
    /// First-year amount, whole dollars.
    pub amount: u32,
    /// Due date of the first grantee report.
    pub first_report_due: NaiveDate,
    /// Second-year amount; paired with `second_report_due`.
    pub second_amount: Option<u32>,
    /// Due date of the second report; paired with `second_amount`.
    pub second_report_due: Option<NaiveDate>,
}

/// An award together with its derived schedule state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardView {
    /// The award row.
    pub award: Award,
    /// Reports the grantee has filed so far.
    pub reports_submitted: u32,
    /// Due date of the next outstanding report, if any remain.
    pub next_report_due: Option<NaiveDate>,
    /// Report number the grantee should file next, if any remain.
    pub next_report_number: Option<u32>,
}

/// Creates awards and reads their schedule state.
#[derive(Clone)]
pub struct AwardService {
    awards: Arc<dyn AwardRepository>,
    applications: Arc<dyn ApplicationRepository>,
    reports: Arc<dyn ReportRepository>,
    clock: Arc<dyn Clock>,
}

impl AwardService {
    /// Create a new service over the given ports.
    pub fn new(
        awards: Arc<dyn AwardRepository>,
        applications: Arc<dyn ApplicationRepository>,
        reports: Arc<dyn ReportRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            awards,
            applications,
            reports,
            clock,
        }
    }

    pub(crate) fn map_award_error(error: AwardRepositoryError) -> Error {
        match error {
            AwardRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("award repository unavailable: {message}"))
            }
            AwardRepositoryError::Query { message } => {
                Error::internal(format!("award repository error: {message}"))
            }
            AwardRepositoryError::Duplicate { .. } => {
                Error::conflict("An award already exists for this application")
            }
        }
    }

    pub(crate) fn map_report_error(error: ReportRepositoryError) -> Error {
        match error {
            ReportRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("report repository unavailable: {message}"))
            }
            ReportRepositoryError::Query { message } => {
                Error::internal(format!("report repository error: {message}"))
            }
            ReportRepositoryError::Duplicate { .. } => {
                Error::conflict("This report has already been submitted")
            }
        }
    }

    /// Staff-only: award a grant against a submitted application.
    pub async fn create(
        &self,
        principal: &Principal,
        application_id: Uuid,
        request: CreateAwardRequest,
    ) -> Result<Award, Error> {
        principal.require_staff()?;
        Self::validate_request(&request)?;

        self.applications
            .find(application_id)
            .await
            .map_err(SubmissionService::map_application_error)?
            .ok_or_else(|| Error::not_found("No such application"))?;

        let mut builder = Award::builder(application_id, request.amount, request.first_report_due)
            .created(self.clock.utc());
        if let (Some(amount), Some(report_due)) = (request.second_amount, request.second_report_due)
        {
            builder = builder.second_year(amount, report_due);
        }
        let award = builder.build();
        self.awards
            .create(&award)
            .await
            .map_err(Self::map_award_error)?;
        info!(
            award_id = %award.id,
            application_id = %application_id,
            grant_length = award.grant_length(),
            "award created"
        );
        Ok(award)
    }

    /// An award with its schedule state; visible to staff and the owning
    /// organization.
    pub async fn detail(&self, principal: &Principal, award_id: Uuid) -> Result<AwardView, Error> {
        let award = self.accessible_award(principal, award_id).await?;
        let reports_submitted = self
            .reports
            .count_submitted(award.id)
            .await
            .map_err(Self::map_report_error)?;
        let next_report_due = award.next_report_due(reports_submitted);
        let next_report_number = award.next_report_number(reports_submitted);
        Ok(AwardView {
            award,
            reports_submitted,
            next_report_due,
            next_report_number,
        })
    }

    /// Find the award and check the caller may see it.
    pub(crate) async fn accessible_award(
        &self,
        principal: &Principal,
        award_id: Uuid,
    ) -> Result<Award, Error> {
        let award = self
            .awards
            .find(award_id)
            .await
            .map_err(Self::map_award_error)?
            .ok_or_else(|| Error::not_found("No such award"))?;
        let application = self
            .applications
            .find(award.application_id)
            .await
            .map_err(SubmissionService::map_application_error)?
            .ok_or_else(|| Error::internal("award references a missing application"))?;
        principal.require_organization_access(application.organization_id)?;
        Ok(award)
    }

    fn validate_request(request: &CreateAwardRequest) -> Result<(), Error> {
        let mut errors = FieldErrors::new();
        if request.amount == 0 {
            errors.insert("amount", "The award amount must be positive.");
        }
        match (request.second_amount, request.second_report_due) {
            (Some(0), _) => {
                errors.insert("secondAmount", "The second-year amount must be positive.");
            }
            (Some(_), None) => {
                errors.insert(
                    "secondReportDue",
                    "A two-year grant needs a second report due date.",
                );
            }
            (None, Some(_)) => {
                errors.insert(
                    "secondAmount",
                    "A second report date needs a second-year amount.",
                );
            }
            _ => {}
        }
        errors.into_result()
    }
}
