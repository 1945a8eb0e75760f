//! Backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware attached to every app.
pub use middleware::Trace;
/// Request-scoped trace identifier exposed via task-local storage.
pub use domain::trace_id::TraceId;
