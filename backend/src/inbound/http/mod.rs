//! HTTP inbound adapter exposing REST endpoints.

pub mod applications;
pub mod awards;
pub mod cycles;
pub mod drafts;
pub mod error;
pub mod health;
pub mod jobs;
pub mod organizations;
pub mod report_drafts;
pub mod rollover;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
