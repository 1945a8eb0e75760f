//! Organization HTTP handlers.
//!
//! ```text
//! GET /api/organizations/me
//! ```

use std::collections::BTreeMap;

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::organization::Organization;
use crate::domain::{DraftService, Error};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Response payload for the caller's organization.
///
/// The profile is rendered form-shaped, keyed by the draft field names it
/// would pre-fill, so clients can show exactly what autofill will insert.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub profile_usable: bool,
    pub profile: BTreeMap<String, String>,
    pub fiscal_letter: Option<String>,
}

impl From<Organization> for OrganizationResponse {
    fn from(organization: Organization) -> Self {
        Self {
            id: organization.id.to_string(),
            name: organization.name,
            email: organization.email,
            profile_usable: organization.profile.is_usable(),
            profile: organization.profile.autofill_contents(),
            fiscal_letter: organization.profile.fiscal_letter,
        }
    }
}

/// Fetch the authenticated caller's organization and cached profile.
#[utoipa::path(
    get,
    path = "/api/organizations/me",
    responses(
        (status = 200, description = "Caller's organization", body = OrganizationResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "An organization account is required", body = ErrorSchema),
        (status = 404, description = "No such organization", body = ErrorSchema)
    ),
    tags = ["organizations"],
    operation_id = "getOwnOrganization"
)]
#[get("/organizations/me")]
pub async fn own_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<OrganizationResponse>> {
    let principal = session.require_principal()?;
    let organization_id = principal.require_organization()?;
    let organization = state
        .organizations
        .find(organization_id)
        .await
        .map_err(DraftService::map_organization_error)?
        .ok_or_else(|| Error::not_found("No such organization"))?;
    Ok(web::Json(OrganizationResponse::from(organization)))
}
