//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (cycles, drafts,
//!   applications, awards, reports, rollover, jobs, health)
//! - **Schemas**: The inbound DTOs plus the error wrappers ([`ErrorSchema`],
//!   [`ErrorCodeSchema`]) that provide OpenAPI definitions without coupling
//!   domain types to the utoipa framework
//! - **Security**: Session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::applications::{AnswerResponse, ApplicationResponse, CreateAwardBody};
use crate::inbound::http::awards::{AwardResponse, AwardViewResponse};
use crate::inbound::http::cycles::{
    CreateCycleBody, CycleDetailResponse, CycleQuestionResponse, CycleReportQuestionResponse,
    CycleResponse, QuestionPick, ReportQuestionPick,
};
use crate::inbound::http::drafts::{
    AutosaveBody, DraftFormResponse, DraftResponse, SubmissionResponse,
};
use crate::inbound::http::jobs::JobReportResponse;
use crate::inbound::http::organizations::OrganizationResponse;
use crate::inbound::http::report_drafts::{
    ReportDraftResponse, ReportFormResponse, ReportSubmissionResponse,
};
use crate::inbound::http::rollover::RolloverBody;
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by the identity frontend.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Grants backend API",
        description = "HTTP interface for grant cycles, applications, awards, and grantee reports.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::cycles::list_cycles,
        crate::inbound::http::cycles::cycle_detail,
        crate::inbound::http::cycles::create_cycle,
        crate::inbound::http::organizations::own_organization,
        crate::inbound::http::drafts::application_form,
        crate::inbound::http::drafts::autosave_draft,
        crate::inbound::http::drafts::attach_draft_file,
        crate::inbound::http::drafts::clear_draft_file,
        crate::inbound::http::drafts::submit_draft,
        crate::inbound::http::drafts::discard_draft,
        crate::inbound::http::applications::application_detail,
        crate::inbound::http::applications::revert_application,
        crate::inbound::http::applications::create_award,
        crate::inbound::http::rollover::rollover,
        crate::inbound::http::rollover::admin_rollover,
        crate::inbound::http::awards::award_detail,
        crate::inbound::http::report_drafts::report_form,
        crate::inbound::http::report_drafts::autosave_report_draft,
        crate::inbound::http::report_drafts::attach_report_file,
        crate::inbound::http::report_drafts::submit_report_draft,
        crate::inbound::http::jobs::trigger_job,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CycleResponse,
        CycleQuestionResponse,
        CycleReportQuestionResponse,
        CycleDetailResponse,
        QuestionPick,
        ReportQuestionPick,
        CreateCycleBody,
        OrganizationResponse,
        DraftResponse,
        DraftFormResponse,
        SubmissionResponse,
        AutosaveBody,
        AnswerResponse,
        ApplicationResponse,
        CreateAwardBody,
        RolloverBody,
        AwardResponse,
        AwardViewResponse,
        ReportDraftResponse,
        ReportFormResponse,
        ReportSubmissionResponse,
        JobReportResponse,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "cycles", description = "Grant cycle listing and assembly"),
        (name = "organizations", description = "Grantee organization profiles"),
        (name = "drafts", description = "Application drafts and uploads"),
        (name = "applications", description = "Submitted applications and staff corrections"),
        (name = "rollover", description = "Copying past work into an open cycle"),
        (name = "awards", description = "Awards and payment schedules"),
        (name = "reports", description = "Grantee report drafts and submissions"),
        (name = "jobs", description = "Scheduled job triggers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
