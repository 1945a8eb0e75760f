//! Submitted application HTTP handlers.
//!
//! ```text
//! GET  /api/applications/{id}
//! POST /api/applications/{id}/revert
//! POST /api/applications/{id}/award
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::application::{NarrativeAnswer, SubmittedApplication};
use crate::domain::{ApplicationView, CreateAwardRequest};
use crate::inbound::http::awards::AwardResponse;
use crate::inbound::http::drafts::DraftResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, parse_date, parse_optional_date, FieldName,
};
use crate::inbound::http::ApiResult;

/// One narrative answer on a submitted application.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub cycle_question_id: String,
    pub text: String,
}

impl From<NarrativeAnswer> for AnswerResponse {
    fn from(answer: NarrativeAnswer) -> Self {
        Self {
            cycle_question_id: answer.cycle_question_id.to_string(),
            text: answer.text,
        }
    }
}

/// Response payload for a submitted application with its answers.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    /// The typed application row, serialised field-for-field.
    #[schema(value_type = Object)]
    pub application: SubmittedApplication,
    /// One answer per cycle question, in cycle order.
    pub answers: Vec<AnswerResponse>,
}

impl From<ApplicationView> for ApplicationResponse {
    fn from(view: ApplicationView) -> Self {
        Self {
            application: view.application,
            answers: view.answers.into_iter().map(Into::into).collect(),
        }
    }
}

/// Request payload for creating an award.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAwardBody {
    pub amount: Option<u32>,
    pub first_report_due: Option<String>,
    pub second_amount: Option<u32>,
    pub second_report_due: Option<String>,
}

fn parse_create_award_body(body: CreateAwardBody) -> Result<CreateAwardRequest, crate::domain::Error> {
    let amount = body
        .amount
        .ok_or_else(|| missing_field_error(FieldName::new("amount")))?;
    let first_report_due = body
        .first_report_due
        .ok_or_else(|| missing_field_error(FieldName::new("firstReportDue")))?;
    Ok(CreateAwardRequest {
        amount,
        first_report_due: parse_date(first_report_due, FieldName::new("firstReportDue"))?,
        second_amount: body.second_amount,
        second_report_due: parse_optional_date(
            body.second_report_due,
            FieldName::new("secondReportDue"),
        )?,
    })
}

/// Fetch a submitted application with its answers.
#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Submitted application", body = ApplicationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "getApplication"
)]
#[get("/applications/{id}")]
pub async fn application_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ApplicationResponse>> {
    let principal = session.require_principal()?;
    let view = state
        .submissions
        .application(&principal, path.into_inner())
        .await?;
    Ok(web::Json(view.into()))
}

/// Staff: convert a submission back into a draft.
#[utoipa::path(
    post,
    path = "/api/applications/{id}/revert",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 201, description = "Draft regenerated", body = DraftResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Staff access required", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema)
    ),
    tags = ["applications"],
    operation_id = "revertApplication"
)]
#[post("/applications/{id}/revert")]
pub async fn revert_application(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let draft = state
        .submissions
        .revert(&principal, path.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(DraftResponse::from(draft)))
}

/// Staff: award a grant against a submitted application.
#[utoipa::path(
    post,
    path = "/api/applications/{id}/award",
    request_body = CreateAwardBody,
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 201, description = "Award created", body = AwardResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Staff access required", body = ErrorSchema),
        (status = 404, description = "No such application", body = ErrorSchema),
        (status = 409, description = "An award already exists", body = ErrorSchema)
    ),
    tags = ["awards"],
    operation_id = "createAward"
)]
#[post("/applications/{id}/award")]
pub async fn create_award(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<CreateAwardBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = parse_create_award_body(payload.into_inner())?;
    let award = state
        .awards
        .create(&principal, path.into_inner(), request)
        .await?;
    Ok(HttpResponse::Created().json(AwardResponse::from(award)))
}
