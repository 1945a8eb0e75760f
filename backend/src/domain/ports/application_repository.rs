//! Port for submitted applications and their transactional edges.
//!
//! Submission and revert are single storage transactions: the adapter
//! writes the application with its answers, removes the draft, and
//! refreshes the organization's cached profile (or performs the exact
//! inverse) atomically. The domain hands over fully converted values and
//! never sees a half-applied state.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::application::{NarrativeAnswer, SubmittedApplication};
use crate::domain::convert::ConvertedSubmission;
use crate::domain::draft::ApplicationDraft;
use crate::domain::organization::OrganizationProfile;

use super::define_port_error;

define_port_error! {
    /// Errors raised by application repository adapters.
    pub enum ApplicationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "application repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "application repository query failed: {message}",
        /// The organization already submitted to this cycle.
        Duplicate { message: String } =>
            "application already exists: {message}",
    }
}

/// Port for submitted application rows and the submit/revert transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Find an application by id.
    async fn find(
        &self,
        application_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError>;

    /// Find the application an organization submitted to a cycle, if any.
    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError>;

    /// Narrative answers for an application, in cycle question order.
    async fn answers(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<NarrativeAnswer>, ApplicationRepositoryError>;

    /// Atomically insert the application with its answers, delete the
    /// source draft, and refresh the organization's cached profile when
    /// this submission is the organization's latest.
    async fn submit(
        &self,
        submission: &ConvertedSubmission,
        draft_id: Uuid,
        profile: &OrganizationProfile,
    ) -> Result<(), ApplicationRepositoryError>;

    /// Atomically delete the application with its answers and insert the
    /// regenerated draft.
    async fn revert(
        &self,
        application_id: Uuid,
        draft: &ApplicationDraft,
    ) -> Result<(), ApplicationRepositoryError>;
}

/// Fixture implementation for tests that do not exercise submissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureApplicationRepository;

#[async_trait]
impl ApplicationRepository for FixtureApplicationRepository {
    async fn find(
        &self,
        _application_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        Ok(None)
    }

    async fn find_for(
        &self,
        _organization_id: Uuid,
        _cycle_id: Uuid,
    ) -> Result<Option<SubmittedApplication>, ApplicationRepositoryError> {
        Ok(None)
    }

    async fn answers(
        &self,
        _application_id: Uuid,
    ) -> Result<Vec<NarrativeAnswer>, ApplicationRepositoryError> {
        Ok(Vec::new())
    }

    async fn submit(
        &self,
        _submission: &ConvertedSubmission,
        _draft_id: Uuid,
        _profile: &OrganizationProfile,
    ) -> Result<(), ApplicationRepositoryError> {
        Ok(())
    }

    async fn revert(
        &self,
        _application_id: Uuid,
        _draft: &ApplicationDraft,
    ) -> Result<(), ApplicationRepositoryError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reads_are_empty() {
        let repo = FixtureApplicationRepository;
        assert!(repo.find(Uuid::new_v4()).await.expect("find").is_none());
        assert!(
            repo.answers(Uuid::new_v4())
                .await
                .expect("answers")
                .is_empty()
        );
    }

    #[rstest]
    fn duplicate_error_formats_message() {
        let err = ApplicationRepositoryError::duplicate("organization/cycle pair taken");
        assert!(err.to_string().contains("pair taken"));
    }
}
