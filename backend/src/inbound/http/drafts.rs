//! Application draft HTTP handlers.
//!
//! ```text
//! GET    /api/cycles/{id}/application
//! PUT    /api/drafts/{id}
//! POST   /api/drafts/{id}/files/{field}
//! DELETE /api/drafts/{id}/files/{field}
//! POST   /api/drafts/{id}/submit
//! DELETE /api/drafts/{id}
//! ```

use std::collections::BTreeMap;
use std::str::FromStr;

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::domain::application::SubmittedApplication;
use crate::domain::draft::{ApplicationDraft, DraftFileField};
use crate::domain::{DraftForm, Error};
use crate::inbound::http::cycles::CycleDetailResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, FieldName};
use crate::inbound::http::ApiResult;

/// Response payload for a draft application.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub id: String,
    pub organization_id: String,
    pub cycle_id: String,
    pub created: String,
    pub modified: String,
    pub modified_by: Option<String>,
    pub contents: BTreeMap<String, String>,
    pub files: BTreeMap<String, String>,
    pub extended_deadline: Option<String>,
}

impl From<ApplicationDraft> for DraftResponse {
    fn from(draft: ApplicationDraft) -> Self {
        Self {
            id: draft.id.to_string(),
            organization_id: draft.organization_id.to_string(),
            cycle_id: draft.cycle_id.to_string(),
            created: draft.created.to_rfc3339(),
            modified: draft.modified.to_rfc3339(),
            modified_by: draft.modified_by,
            contents: draft.contents,
            files: draft
                .files
                .into_iter()
                .map(|(field, reference)| (field.as_str().to_owned(), reference))
                .collect(),
            extended_deadline: draft.extended_deadline.map(|ts| ts.to_rfc3339()),
        }
    }
}

/// Response payload for the application form model.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftFormResponse {
    pub detail: CycleDetailResponse,
    pub draft: DraftResponse,
    pub created: bool,
}

impl From<DraftForm> for DraftFormResponse {
    fn from(form: DraftForm) -> Self {
        Self {
            detail: form.detail.into(),
            draft: form.draft.into(),
            created: form.created,
        }
    }
}

/// Response payload summarising a successful submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub id: String,
    pub organization_id: String,
    pub cycle_id: String,
    pub submission_time: String,
}

impl From<SubmittedApplication> for SubmissionResponse {
    fn from(application: SubmittedApplication) -> Self {
        Self {
            id: application.id.to_string(),
            organization_id: application.organization_id.to_string(),
            cycle_id: application.cycle_id.to_string(),
            submission_time: application.submission_time.to_rfc3339(),
        }
    }
}

/// Request payload for an autosave.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveBody {
    pub contents: Option<BTreeMap<String, String>>,
}

/// Query flag confirming an overwrite of a competing editor's save.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ForceQuery {
    #[serde(default)]
    pub force: bool,
}

/// Query parameter naming an uploaded file.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

pub(crate) fn parse_file_field(raw: &str) -> Result<DraftFileField, Error> {
    DraftFileField::from_str(raw).map_err(|_| Error::not_found("No such file field"))
}

pub(crate) fn require_filename(query: UploadQuery) -> Result<String, Error> {
    query
        .filename
        .ok_or_else(|| missing_field_error(FieldName::new("filename")))
}

/// Get or create the caller's draft for a cycle and return the form model.
#[utoipa::path(
    get,
    path = "/api/cycles/{id}/application",
    params(("id" = Uuid, Path, description = "Cycle id")),
    responses(
        (status = 200, description = "Application form model", body = DraftFormResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "An organization account is required", body = ErrorSchema),
        (status = 404, description = "No such cycle", body = ErrorSchema),
        (status = 409, description = "The application period is not open", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "getApplicationForm"
)]
#[get("/cycles/{id}/application")]
pub async fn application_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<DraftFormResponse>> {
    let principal = session.require_principal()?;
    let form = state
        .drafts
        .get_or_create(&principal, path.into_inner())
        .await?;
    Ok(web::Json(form.into()))
}

/// Autosave a draft's whole contents map.
#[utoipa::path(
    put,
    path = "/api/drafts/{id}",
    request_body = AutosaveBody,
    params(
        ("id" = Uuid, Path, description = "Draft id"),
        ForceQuery
    ),
    responses(
        (status = 200, description = "Draft saved", body = DraftResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such draft", body = ErrorSchema),
        (status = 409, description = "A competing editor saved first", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "autosaveDraft"
)]
#[put("/drafts/{id}")]
pub async fn autosave_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    query: web::Query<ForceQuery>,
    payload: web::Json<AutosaveBody>,
) -> ApiResult<web::Json<DraftResponse>> {
    let principal = session.require_principal()?;
    let contents = payload.into_inner().contents.unwrap_or_default();
    let draft = state
        .drafts
        .autosave(&principal, path.into_inner(), contents, query.force)
        .await?;
    Ok(web::Json(draft.into()))
}

/// Upload a file attachment into a named draft slot.
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/files/{field}",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    params(
        ("id" = Uuid, Path, description = "Draft id"),
        ("field" = String, Path, description = "File slot name, e.g. budget1"),
        UploadQuery
    ),
    responses(
        (status = 200, description = "File attached", body = DraftResponse),
        (status = 400, description = "Disallowed file extension", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such draft or file field", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "attachDraftFile"
)]
#[post("/drafts/{id}/files/{field}")]
pub async fn attach_draft_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, String)>,
    query: web::Query<UploadQuery>,
    bytes: web::Bytes,
) -> ApiResult<web::Json<DraftResponse>> {
    let principal = session.require_principal()?;
    let (draft_id, raw_field) = path.into_inner();
    let field = parse_file_field(&raw_field)?;
    let filename = require_filename(query.into_inner())?;
    let draft = state
        .drafts
        .attach_file(&principal, draft_id, field, &filename, &bytes)
        .await?;
    Ok(web::Json(draft.into()))
}

/// Clear a named draft file slot.
#[utoipa::path(
    delete,
    path = "/api/drafts/{id}/files/{field}",
    params(
        ("id" = Uuid, Path, description = "Draft id"),
        ("field" = String, Path, description = "File slot name, e.g. budget1")
    ),
    responses(
        (status = 200, description = "File cleared", body = DraftResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such draft or file field", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "clearDraftFile"
)]
#[delete("/drafts/{id}/files/{field}")]
pub async fn clear_draft_file(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(Uuid, String)>,
) -> ApiResult<web::Json<DraftResponse>> {
    let principal = session.require_principal()?;
    let (draft_id, raw_field) = path.into_inner();
    let field = parse_file_field(&raw_field)?;
    let draft = state
        .drafts
        .clear_file(&principal, draft_id, field)
        .await?;
    Ok(web::Json(draft.into()))
}

/// Validate a draft and convert it into a submitted application.
#[utoipa::path(
    post,
    path = "/api/drafts/{id}/submit",
    params(("id" = Uuid, Path, description = "Draft id")),
    responses(
        (status = 201, description = "Application submitted", body = SubmissionResponse),
        (status = 400, description = "Validation failed", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such draft", body = ErrorSchema),
        (status = 409, description = "Period closed or already submitted", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "submitDraft"
)]
#[post("/drafts/{id}/submit")]
pub async fn submit_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let application = state
        .submissions
        .submit(&principal, path.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(SubmissionResponse::from(application)))
}

/// Discard a draft and its uploaded files.
#[utoipa::path(
    delete,
    path = "/api/drafts/{id}",
    params(("id" = Uuid, Path, description = "Draft id")),
    responses(
        (status = 204, description = "Draft discarded"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such draft", body = ErrorSchema)
    ),
    tags = ["drafts"],
    operation_id = "discardDraft"
)]
#[delete("/drafts/{id}")]
pub async fn discard_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    state
        .drafts
        .discard(&principal, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
