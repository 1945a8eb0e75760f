//! Scheduled-job trigger endpoint.
//!
//! ```text
//! POST /api/jobs/{kind}
//! ```
//!
//! An external scheduler invokes these daily, authenticated by a shared
//! token header. A logged-in staff member may also trigger a job by hand.
//! Both paths land on the run ledger, so repeat invocations within a day
//! are no-ops.

use std::str::FromStr;

use actix_web::{post, web, HttpRequest};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::jobs::{JobKind, JobReport};
use crate::domain::Error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Header carrying the external scheduler's shared token.
pub const SCHEDULER_TOKEN_HEADER: &str = "X-Scheduler-Token";

/// Response payload for one job invocation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobReportResponse {
    pub kind: String,
    pub skipped: bool,
    pub outcome: String,
}

impl From<JobReport> for JobReportResponse {
    fn from(report: JobReport) -> Self {
        Self {
            kind: report.kind.to_string(),
            skipped: report.skipped,
            outcome: report.outcome,
        }
    }
}

pub(crate) fn parse_job_kind(raw: &str) -> Result<JobKind, Error> {
    JobKind::from_str(raw).map_err(|_| Error::not_found("No such job"))
}

fn presented_token(request: &HttpRequest) -> Option<&str> {
    request
        .headers()
        .get(SCHEDULER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Whether the request may trigger jobs: a matching scheduler token, or
/// a staff session when no token was presented.
async fn authorize_trigger(
    state: &HttpState,
    session: &SessionContext,
    request: &HttpRequest,
) -> Result<(), Error> {
    if let (Some(expected), Some(presented)) =
        (state.scheduler_token.as_deref(), presented_token(request))
    {
        if expected == presented {
            return Ok(());
        }
        return Err(Error::unauthorized("invalid scheduler token"));
    }
    let principal = session.require_principal()?;
    principal.require_staff()?;
    Ok(())
}

/// Trigger one scheduled job run.
#[utoipa::path(
    post,
    path = "/api/jobs/{kind}",
    params(("kind" = String, Path, description = "auto-cycles, draft-warnings, or report-reminders")),
    responses(
        (status = 200, description = "Job ran or was skipped for today", body = JobReportResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Staff access required", body = ErrorSchema),
        (status = 404, description = "No such job", body = ErrorSchema)
    ),
    tags = ["jobs"],
    operation_id = "triggerJob"
)]
#[post("/jobs/{kind}")]
pub async fn trigger_job(
    state: web::Data<HttpState>,
    session: SessionContext,
    request: HttpRequest,
    path: web::Path<String>,
) -> ApiResult<web::Json<JobReportResponse>> {
    let kind = parse_job_kind(&path.into_inner())?;
    authorize_trigger(&state, &session, &request).await?;
    let report = match kind {
        JobKind::AutoCycles => state.auto_cycles.run().await?,
        JobKind::DraftWarnings => state.draft_warnings.run().await?,
        JobKind::ReportReminders => state.report_reminders.run().await?,
    };
    Ok(web::Json(report.into()))
}
