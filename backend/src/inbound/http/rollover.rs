//! Rollover HTTP handlers.
//!
//! ```text
//! POST /api/rollover
//! POST /api/admin/rollover
//! ```

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, RolloverRequest};
use crate::inbound::http::drafts::DraftResponse;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{missing_field_error, parse_uuid, FieldName};
use crate::inbound::http::ApiResult;

/// Request payload for copying an old application into a new cycle.
///
/// Exactly one of `draftId` and `applicationId` names the source.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RolloverBody {
    pub draft_id: Option<String>,
    pub application_id: Option<String>,
    pub target_cycle_id: Option<String>,
}

fn parse_rollover_body(body: RolloverBody) -> Result<RolloverRequest, Error> {
    let target_cycle_id = body
        .target_cycle_id
        .ok_or_else(|| missing_field_error(FieldName::new("targetCycleId")))?;
    Ok(RolloverRequest {
        draft_id: body
            .draft_id
            .map(|raw| parse_uuid(raw, FieldName::new("draftId")))
            .transpose()?,
        application_id: body
            .application_id
            .map(|raw| parse_uuid(raw, FieldName::new("applicationId")))
            .transpose()?,
        target_cycle_id: parse_uuid(target_cycle_id, FieldName::new("targetCycleId"))?,
    })
}

/// Copy the caller's old answers into a draft for an open cycle.
#[utoipa::path(
    post,
    path = "/api/rollover",
    request_body = RolloverBody,
    responses(
        (status = 201, description = "Draft created from the source", body = DraftResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "No such source or cycle", body = ErrorSchema),
        (status = 409, description = "Target cycle closed or draft exists", body = ErrorSchema)
    ),
    tags = ["rollover"],
    operation_id = "rollover"
)]
#[post("/rollover")]
pub async fn rollover(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RolloverBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = parse_rollover_body(payload.into_inner())?;
    let draft = state.rollovers.rollover(&principal, request).await?;
    Ok(HttpResponse::Created().json(DraftResponse::from(draft)))
}

/// Staff: roll any organization's application over, ignoring cycle windows.
#[utoipa::path(
    post,
    path = "/api/admin/rollover",
    request_body = RolloverBody,
    responses(
        (status = 201, description = "Draft created from the source", body = DraftResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Staff access required", body = ErrorSchema),
        (status = 404, description = "No such source or cycle", body = ErrorSchema),
        (status = 409, description = "A draft already exists in the target", body = ErrorSchema)
    ),
    tags = ["rollover"],
    operation_id = "adminRollover"
)]
#[post("/admin/rollover")]
pub async fn admin_rollover(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RolloverBody>,
) -> ApiResult<HttpResponse> {
    let principal = session.require_principal()?;
    let request = parse_rollover_body(payload.into_inner())?;
    let draft = state
        .rollovers
        .rollover_as_staff(&principal, request)
        .await?;
    Ok(HttpResponse::Created().json(DraftResponse::from(draft)))
}
