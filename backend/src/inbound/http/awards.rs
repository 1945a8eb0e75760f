//! Award HTTP handlers.
//!
//! ```text
//! GET /api/awards/{id}
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::award::Award;
use crate::domain::AwardView;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Response payload for an award.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    pub id: String,
    pub application_id: String,
    pub created: String,
    pub amount: u32,
    pub second_amount: Option<u32>,
    pub total_amount: u32,
    pub grant_length: u32,
    pub first_report_due: String,
    pub second_report_due: Option<String>,
    pub check_mailed: Option<String>,
    pub second_check_mailed: Option<String>,
    pub agreement_mailed: Option<String>,
    pub agreement_returned: Option<String>,
    pub agreement_due: Option<String>,
    pub approved: Option<String>,
    pub fully_paid: bool,
}

impl From<Award> for AwardResponse {
    fn from(award: Award) -> Self {
        let date = |value: Option<chrono::NaiveDate>| value.map(|d| d.to_string());
        Self {
            id: award.id.to_string(),
            application_id: award.application_id.to_string(),
            created: award.created.to_rfc3339(),
            amount: award.amount,
            second_amount: award.second_amount,
            total_amount: award.total_amount(),
            grant_length: award.grant_length(),
            first_report_due: award.first_report_due.to_string(),
            second_report_due: date(award.second_report_due),
            check_mailed: date(award.check_mailed),
            second_check_mailed: date(award.second_check_mailed),
            agreement_mailed: date(award.agreement_mailed),
            agreement_returned: date(award.agreement_returned),
            agreement_due: date(award.agreement_due()),
            approved: date(award.approved),
            fully_paid: award.fully_paid(),
        }
    }
}

/// Response payload for an award with its derived schedule state.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwardViewResponse {
    pub award: AwardResponse,
    pub reports_submitted: u32,
    pub next_report_due: Option<String>,
    pub next_report_number: Option<u32>,
}

impl From<AwardView> for AwardViewResponse {
    fn from(view: AwardView) -> Self {
        Self {
            award: view.award.into(),
            reports_submitted: view.reports_submitted,
            next_report_due: view.next_report_due.map(|d| d.to_string()),
            next_report_number: view.next_report_number,
        }
    }
}

/// Fetch an award with its report schedule state.
#[utoipa::path(
    get,
    path = "/api/awards/{id}",
    params(("id" = Uuid, Path, description = "Award id")),
    responses(
        (status = 200, description = "Award with schedule state", body = AwardViewResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such award", body = ErrorSchema)
    ),
    tags = ["awards"],
    operation_id = "getAward"
)]
#[get("/awards/{id}")]
pub async fn award_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<AwardViewResponse>> {
    let principal = session.require_principal()?;
    let view = state.awards.detail(&principal, path.into_inner()).await?;
    Ok(web::Json(view.into()))
}
