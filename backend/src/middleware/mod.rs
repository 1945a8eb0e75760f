//! Request middleware.
//!
//! Cross-cutting request lifecycle concerns. Tracing attaches a per-request
//! trace id and echoes it back in the response, so a failure an applicant
//! reports can be matched against the server logs.

pub mod trace;

pub use trace::Trace;
