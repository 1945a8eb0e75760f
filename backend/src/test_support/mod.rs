//! Shared test doubles and fixtures for unit and integration tests.

pub mod clock;
pub mod fixtures;
