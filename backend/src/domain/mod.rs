//! Domain entities, services, and ports.
//!
//! The domain is the hexagon's core: entities model grant cycles,
//! drafts, applications, awards, and reports; services implement the
//! operations the inbound layer exposes; ports describe what the domain
//! needs from driven adapters. Nothing in here touches a database, a
//! socket, or the mail backend directly.
//!
//! Public surface:
//! - Error / ErrorCode (alias to `error::*`) — API error response payload.
//! - Principal (alias to `auth::Principal`) — authenticated caller.
//! - The service types re-exported below, one per operation family.

pub mod application;
pub mod attachments;
pub mod auth;
pub mod award;
pub mod award_service;
pub mod convert;
pub mod cycle;
pub mod cycle_service;
pub mod draft;
pub mod draft_service;
pub mod error;
pub mod jobs;
pub mod organization;
pub mod ports;
pub mod question;
pub mod report;
pub mod report_service;
pub mod rollover_service;
pub mod submission_service;
pub mod trace_id;
pub mod validation;
pub mod wordcount;

pub use self::auth::Principal;
pub use self::award_service::{AwardService, AwardView, CreateAwardRequest};
pub use self::cycle_service::{
    CreateCycleRequest, CycleService, QuestionAssignment, ReportQuestionAssignment,
};
pub use self::draft_service::{DraftForm, DraftService};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::report_service::{ReportForm, ReportService};
pub use self::rollover_service::{RolloverRequest, RolloverService};
pub use self::submission_service::{ApplicationView, SubmissionService};
pub use self::trace_id::{TraceId, TRACE_ID_HEADER};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
