//! Port for organization reads.
//!
//! Organizations are registered by the identity provider; this side only
//! reads them. The cached profile fields are refreshed inside the submission
//! transaction, so the write path lives on the application repository.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::organization::Organization;

use super::define_port_error;

define_port_error! {
    /// Errors raised by organization repository adapters.
    pub enum OrganizationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "organization repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "organization repository query failed: {message}",
    }
}

/// Port for reading organization rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Find an organization by id.
    async fn find(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise organization reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureOrganizationRepository;

#[async_trait]
impl OrganizationRepository for FixtureOrganizationRepository {
    async fn find(
        &self,
        _organization_id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_find_returns_none() {
        let repo = FixtureOrganizationRepository;
        let found = repo
            .find(Uuid::new_v4())
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = OrganizationRepositoryError::connection("pool exhausted");
        assert!(err.to_string().contains("pool exhausted"));
    }
}
