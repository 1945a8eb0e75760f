//! Grant cycle HTTP handlers.
//!
//! ```text
//! GET  /api/cycles
//! GET  /api/cycles/{id}
//! POST /api/cycles
//! ```

use std::str::FromStr;

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::cycle::{
    AssembledQuestion, AssembledReportQuestion, CycleDetail, CycleType, GrantCycle,
};
use crate::domain::{CreateCycleRequest, Error, QuestionAssignment, ReportQuestionAssignment};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    missing_field_error, parse_rfc3339_timestamp, parse_uuid, FieldName,
};
use crate::inbound::http::ApiResult;

/// Response payload for one grant cycle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleResponse {
    pub id: String,
    pub title: String,
    pub cycle_type: String,
    pub open_time: String,
    pub close_time: String,
    pub info_url: Option<String>,
    pub private: bool,
    pub amount_note: Option<String>,
}

impl From<GrantCycle> for CycleResponse {
    fn from(cycle: GrantCycle) -> Self {
        Self {
            id: cycle.id.to_string(),
            title: cycle.title,
            cycle_type: cycle.cycle_type.to_string(),
            open_time: cycle.open_time.to_rfc3339(),
            close_time: cycle.close_time.to_rfc3339(),
            info_url: cycle.info_url,
            private: cycle.private,
            amount_note: cycle.amount_note,
        }
    }
}

/// A narrative question at its cycle position.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleQuestionResponse {
    pub cycle_question_id: String,
    pub order: u32,
    pub name: String,
    pub text: String,
    pub word_limit: Option<u32>,
}

impl From<AssembledQuestion> for CycleQuestionResponse {
    fn from(assembled: AssembledQuestion) -> Self {
        Self {
            cycle_question_id: assembled.cycle_question_id.to_string(),
            order: assembled.order,
            name: assembled.question.name,
            text: assembled.question.text,
            word_limit: assembled.question.word_limit,
        }
    }
}

/// A report question at its cycle position.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleReportQuestionResponse {
    pub cycle_report_question_id: String,
    pub order: u32,
    pub required: bool,
    pub name: String,
    pub text: String,
    pub input_type: String,
    pub word_limit: u32,
}

impl From<AssembledReportQuestion> for CycleReportQuestionResponse {
    fn from(assembled: AssembledReportQuestion) -> Self {
        Self {
            cycle_report_question_id: assembled.cycle_report_question_id.to_string(),
            order: assembled.order,
            required: assembled.required,
            name: assembled.question.name,
            text: assembled.question.text,
            input_type: assembled.question.input_type.to_string(),
            word_limit: assembled.question.word_limit,
        }
    }
}

/// Response payload for a cycle with its ordered question sets.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CycleDetailResponse {
    pub cycle: CycleResponse,
    pub questions: Vec<CycleQuestionResponse>,
    pub report_questions: Vec<CycleReportQuestionResponse>,
}

impl From<CycleDetail> for CycleDetailResponse {
    fn from(detail: CycleDetail) -> Self {
        Self {
            cycle: detail.cycle.into(),
            questions: detail.questions.into_iter().map(Into::into).collect(),
            report_questions: detail
                .report_questions
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// One narrative question pick in a create-cycle request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPick {
    pub question_id: String,
    pub order: u32,
}

/// One report question pick in a create-cycle request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuestionPick {
    pub report_question_id: String,
    pub order: u32,
    #[serde(default)]
    pub required: bool,
}

/// Request payload for creating a grant cycle.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCycleBody {
    pub title: Option<String>,
    pub cycle_type: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub info_url: Option<String>,
    #[serde(default)]
    pub private: bool,
    pub amount_note: Option<String>,
    pub questions: Option<Vec<QuestionPick>>,
    pub report_questions: Option<Vec<ReportQuestionPick>>,
}

fn invalid_cycle_type_error(value: &str) -> Error {
    Error::invalid_request("cycle type must be standard, rapid, or seed").with_details(json!({
        "field": "cycleType",
        "value": value,
        "code": "invalid_cycle_type",
    }))
}

fn parse_create_cycle_body(body: CreateCycleBody) -> Result<CreateCycleRequest, Error> {
    let title = body
        .title
        .ok_or_else(|| missing_field_error(FieldName::new("title")))?;
    let open_time = body
        .open_time
        .ok_or_else(|| missing_field_error(FieldName::new("openTime")))?;
    let close_time = body
        .close_time
        .ok_or_else(|| missing_field_error(FieldName::new("closeTime")))?;

    let cycle_type = body
        .cycle_type
        .map(|raw| CycleType::from_str(&raw).map_err(|_| invalid_cycle_type_error(&raw)))
        .transpose()?;

    let questions = body
        .questions
        .unwrap_or_default()
        .into_iter()
        .map(|pick| {
            Ok(QuestionAssignment {
                question_id: parse_uuid(pick.question_id, FieldName::new("questions"))?,
                order: pick.order,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let report_questions = body
        .report_questions
        .unwrap_or_default()
        .into_iter()
        .map(|pick| {
            Ok(ReportQuestionAssignment {
                report_question_id: parse_uuid(
                    pick.report_question_id,
                    FieldName::new("reportQuestions"),
                )?,
                order: pick.order,
                required: pick.required,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(CreateCycleRequest {
        title,
        cycle_type,
        open_time: parse_rfc3339_timestamp(open_time, FieldName::new("openTime"))?,
        close_time: parse_rfc3339_timestamp(close_time, FieldName::new("closeTime"))?,
        info_url: body.info_url,
        private: body.private,
        amount_note: body.amount_note,
        questions,
        report_questions,
    })
}

/// List cycles currently open to applicants.
#[utoipa::path(
    get,
    path = "/api/cycles",
    description = "Cycles currently open for applications, excluding private ones.",
    responses(
        (status = 200, description = "Open cycles", body = [CycleResponse]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["cycles"],
    operation_id = "listOpenCycles"
)]
#[get("/cycles")]
pub async fn list_cycles(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<CycleResponse>>> {
    let cycles = state.cycles.list_open().await?;
    Ok(web::Json(cycles.into_iter().map(Into::into).collect()))
}

/// Fetch one cycle with its ordered questions.
#[utoipa::path(
    get,
    path = "/api/cycles/{id}",
    params(("id" = Uuid, Path, description = "Cycle id")),
    responses(
        (status = 200, description = "Cycle detail", body = CycleDetailResponse),
        (status = 404, description = "No such cycle", body = ErrorSchema)
    ),
    tags = ["cycles"],
    operation_id = "getCycleDetail"
)]
#[get("/cycles/{id}")]
pub async fn cycle_detail(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<CycleDetailResponse>> {
    let detail = state.cycles.detail(path.into_inner()).await?;
    Ok(web::Json(detail.into()))
}

/// Staff: create a cycle with its question assembly.
#[utoipa::path(
    post,
    path = "/api/cycles",
    request_body = CreateCycleBody,
    responses(
        (status = 201, description = "Cycle created", body = CycleResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Staff access required", body = ErrorSchema)
    ),
    tags = ["cycles"],
    operation_id = "createCycle"
)]
#[post("/cycles")]
pub async fn create_cycle(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateCycleBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = parse_create_cycle_body(payload.into_inner())?;
    let cycle = state.cycles.create(&principal, request).await?;
    Ok(HttpResponse::Created().json(CycleResponse::from(cycle)))
}
