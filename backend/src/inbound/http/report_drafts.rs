//! Grantee report HTTP handlers.
//!
//! ```text
//! GET  /api/awards/{id}/report
//! PUT  /api/report-drafts/{id}
//! POST /api/report-drafts/{id}/files/{field}
//! POST /api/report-drafts/{id}/submit
//! ```

use std::collections::BTreeMap;

use actix_web::{get, post, put, web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::report::{GranteeReport, ReportDraft};
use crate::domain::ReportForm;
use crate::inbound::http::awards::AwardResponse;
use crate::inbound::http::cycles::CycleReportQuestionResponse;
use crate::inbound::http::drafts::{require_filename, AutosaveBody, ForceQuery, UploadQuery};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Response payload for a report draft.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraftResponse {
    pub id: String,
    pub award_id: String,
    pub report_number: u32,
    pub created: String,
    pub modified: String,
    pub modified_by: Option<String>,
    pub contents: BTreeMap<String, String>,
    pub files: BTreeMap<String, String>,
}

impl From<ReportDraft> for ReportDraftResponse {
    fn from(draft: ReportDraft) -> Self {
        Self {
            id: draft.id.to_string(),
            award_id: draft.award_id.to_string(),
            report_number: draft.report_number,
            created: draft.created.to_rfc3339(),
            modified: draft.modified.to_rfc3339(),
            modified_by: draft.modified_by,
            contents: draft.contents,
            files: draft.files,
        }
    }
}

/// Response payload for the report form model.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFormResponse {
    pub award: AwardResponse,
    pub draft: ReportDraftResponse,
    pub questions: Vec<CycleReportQuestionResponse>,
    pub due_date: Option<String>,
    pub created: bool,
}

impl From<ReportForm> for ReportFormResponse {
    fn from(form: ReportForm) -> Self {
        Self {
            award: form.award.into(),
            draft: form.draft.into(),
            questions: form.questions.into_iter().map(Into::into).collect(),
            due_date: form.due_date.map(|d| d.to_string()),
            created: form.created,
        }
    }
}

/// Response payload summarising a submitted report.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSubmissionResponse {
    pub id: String,
    pub award_id: String,
    pub report_number: u32,
    pub submitted: String,
}

impl From<GranteeReport> for ReportSubmissionResponse {
    fn from(report: GranteeReport) -> Self {
        Self {
            id: report.id.to_string(),
            award_id: report.award_id.to_string(),
            report_number: report.report_number,
            submitted: report.submitted.to_rfc3339(),
        }
    }
}

/// Get or create the draft for the award's next scheduled report.
#[utoipa::path(
    get,
    path = "/api/awards/{id}/report",
    params(("id" = Uuid, Path, description = "Award id")),
    responses(
        (status = 200, description = "Report form model", body = ReportFormResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such award", body = ErrorSchema),
        (status = 409, description = "No report is currently owed", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "getReportForm"
)]
#[get("/awards/{id}/report")]
pub async fn report_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ReportFormResponse>> {
    let principal = session.require_principal()?;
    let form = state
        .reports
        .get_or_create(&principal, path.into_inner())
        .await?;
    Ok(web::Json(form.into()))
}

/// Autosave a report draft's whole contents map.
#[utoipa::path(
    put,
    path = "/api/report-drafts/{id}",
    request_body = AutosaveBody,
    params(
        ("id" = Uuid, Path, description = "Report draft id"),
        ForceQuery
    ),
    responses(
        (status = 200, description = "Draft saved", body = ReportDraftResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such report draft", body = ErrorSchema),
        (status = 409, description = "A competing editor saved first", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "autosaveReportDraft"
)]
#[put("/report-drafts/{id}")]
pub async fn autosave_report_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    query: web::Query<ForceQuery>,
    payload: web::Json<AutosaveBody>,
) -> ApiResult<web::Json<ReportDraftResponse>> {
    let principal = session.require_principal()?;
    let contents = payload.into_inner().contents.unwrap_or_default();
    let draft = state
        .reports
        .autosave(&principal, path.into_inner(), contents, query.force)
        .await?;
    Ok(web::Json(draft.into()))
}

/// Upload a file answer for a file or photo report question.
#[utoipa::path(
    post,
    path = "/api/report-drafts/{id}/files/{field}",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    params(
        ("id" = Uuid, Path, description = "Report draft id"),
        ("field" = String, Path, description = "Report question name"),
        UploadQuery
    ),
    responses(
        (status = 200, description = "File attached", body = ReportDraftResponse),
        (status = 400, description = "Disallowed file extension", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such draft or question", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "attachReportFile"
)]
#[post("/report-drafts/{id}/files/{field}")]
pub async fn attach_report_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, String)>,
    query: web::Query<UploadQuery>,
    bytes: web::Bytes,
) -> ApiResult<web::Json<ReportDraftResponse>> {
    let principal = session.require_principal()?;
    let (draft_id, question_name) = path.into_inner();
    let filename = require_filename(query.into_inner())?;
    let draft = state
        .reports
        .attach_file(&principal, draft_id, &question_name, &filename, &bytes)
        .await?;
    Ok(web::Json(draft.into()))
}

/// Validate a report draft and convert it into a submitted report.
#[utoipa::path(
    post,
    path = "/api/report-drafts/{id}/submit",
    params(("id" = Uuid, Path, description = "Report draft id")),
    responses(
        (status = 201, description = "Report submitted", body = ReportSubmissionResponse),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such report draft", body = ErrorSchema),
        (status = 409, description = "Already submitted", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "submitReportDraft"
)]
#[post("/report-drafts/{id}/submit")]
pub async fn submit_report_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let report = state
        .reports
        .submit(&principal, path.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(ReportSubmissionResponse::from(report)))
}
