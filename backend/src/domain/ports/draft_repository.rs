//! Port for application draft persistence.
//!
//! Drafts are keyed by `(organization, cycle)` and saved whole on each
//! autosave; the conflict protocol lives in the domain, not here. The
//! reassignment operation exists for the auto-creation job, which moves
//! still-open drafts from a closed cycle onto its successor.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::draft::ApplicationDraft;

use super::define_port_error;

define_port_error! {
    /// Errors raised by draft repository adapters.
    pub enum DraftRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "draft repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "draft repository query failed: {message}",
    }
}

/// Port for draft rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Find a draft by id.
    async fn find(&self, draft_id: Uuid) -> Result<Option<ApplicationDraft>, DraftRepositoryError>;

    /// Find the draft an organization holds for a cycle, if any.
    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError>;

    /// All drafts for a cycle, in creation order.
    async fn list_for_cycle(
        &self,
        cycle_id: Uuid,
    ) -> Result<Vec<ApplicationDraft>, DraftRepositoryError>;

    /// Insert or replace the whole draft row.
    async fn save(&self, draft: &ApplicationDraft) -> Result<(), DraftRepositoryError>;

    /// Delete a draft by id. Deleting an absent draft is not an error.
    async fn delete(&self, draft_id: Uuid) -> Result<(), DraftRepositoryError>;

    /// Move every draft from one cycle onto another, returning how many
    /// rows moved.
    async fn reassign_cycle(
        &self,
        from_cycle_id: Uuid,
        to_cycle_id: Uuid,
    ) -> Result<u64, DraftRepositoryError>;
}

/// Fixture implementation for tests that do not exercise draft persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDraftRepository;

#[async_trait]
impl DraftRepository for FixtureDraftRepository {
    async fn find(
        &self,
        _draft_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        Ok(None)
    }

    async fn find_for(
        &self,
        _organization_id: Uuid,
        _cycle_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        Ok(None)
    }

    async fn list_for_cycle(
        &self,
        _cycle_id: Uuid,
    ) -> Result<Vec<ApplicationDraft>, DraftRepositoryError> {
        Ok(Vec::new())
    }

    async fn save(&self, _draft: &ApplicationDraft) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _draft_id: Uuid) -> Result<(), DraftRepositoryError> {
        Ok(())
    }

    async fn reassign_cycle(
        &self,
        _from_cycle_id: Uuid,
        _to_cycle_id: Uuid,
    ) -> Result<u64, DraftRepositoryError> {
        Ok(0)
    }
}
