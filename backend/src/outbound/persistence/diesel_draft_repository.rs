//! PostgreSQL-backed `DraftRepository` implementation using Diesel.
//!
//! Drafts save whole on every autosave, so writes are upserts keyed on the
//! row id. The staleness protocol lives in the domain; this adapter only
//! persists the `modified`/`modified_by` columns it relies on.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::draft::ApplicationDraft;
use crate::domain::ports::{DraftRepository, DraftRepositoryError};

use super::diesel_helpers::{
    collect_rows, map_basic_diesel_error, map_basic_pool_error,
};
use super::json_serializers::{
    file_map_to_json, json_to_file_map, json_to_string_map, string_map_to_json,
};
use super::models::ApplicationDraftRow;
use super::pool::{DbPool, PoolError};
use super::schema::application_drafts;

/// Diesel-backed implementation of the `DraftRepository` port.
#[derive(Clone)]
pub struct DieselDraftRepository {
    pool: DbPool,
}

impl DieselDraftRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> DraftRepositoryError {
    map_basic_pool_error(error, DraftRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DraftRepositoryError {
    map_basic_diesel_error(
        error,
        DraftRepositoryError::query,
        DraftRepositoryError::connection,
    )
}

pub(super) fn row_to_draft(row: ApplicationDraftRow) -> Result<ApplicationDraft, String> {
    Ok(ApplicationDraft {
        id: row.id,
        organization_id: row.organization_id,
        cycle_id: row.cycle_id,
        created: row.created,
        modified: row.modified,
        modified_by: row.modified_by,
        contents: json_to_string_map(row.contents)?,
        files: json_to_file_map(row.files)?,
        extended_deadline: row.extended_deadline,
    })
}

pub(super) fn draft_to_row(draft: &ApplicationDraft) -> ApplicationDraftRow {
    ApplicationDraftRow {
        id: draft.id,
        organization_id: draft.organization_id,
        cycle_id: draft.cycle_id,
        created: draft.created,
        modified: draft.modified,
        modified_by: draft.modified_by.clone(),
        contents: string_map_to_json(&draft.contents),
        files: file_map_to_json(&draft.files),
        extended_deadline: draft.extended_deadline,
    }
}

#[async_trait]
impl DraftRepository for DieselDraftRepository {
    async fn find(
        &self,
        draft_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ApplicationDraftRow> = application_drafts::table
            .filter(application_drafts::id.eq(draft_id))
            .select(ApplicationDraftRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_draft)
            .transpose()
            .map_err(DraftRepositoryError::query)
    }

    async fn find_for(
        &self,
        organization_id: Uuid,
        cycle_id: Uuid,
    ) -> Result<Option<ApplicationDraft>, DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ApplicationDraftRow> = application_drafts::table
            .filter(application_drafts::organization_id.eq(organization_id))
            .filter(application_drafts::cycle_id.eq(cycle_id))
            .select(ApplicationDraftRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_draft)
            .transpose()
            .map_err(DraftRepositoryError::query)
    }

    async fn list_for_cycle(
        &self,
        cycle_id: Uuid,
    ) -> Result<Vec<ApplicationDraft>, DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ApplicationDraftRow> = application_drafts::table
            .filter(application_drafts::cycle_id.eq(cycle_id))
            .order_by(application_drafts::created.asc())
            .select(ApplicationDraftRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows.into_iter().map(row_to_draft), DraftRepositoryError::query)
    }

    async fn save(&self, draft: &ApplicationDraft) -> Result<(), DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = draft_to_row(draft);
        diesel::insert_into(application_drafts::table)
            .values(&row)
            .on_conflict(application_drafts::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, draft_id: Uuid) -> Result<(), DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::delete(application_drafts::table.filter(application_drafts::id.eq(draft_id)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn reassign_cycle(
        &self,
        from_cycle_id: Uuid,
        to_cycle_id: Uuid,
    ) -> Result<u64, DraftRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let moved = diesel::update(
            application_drafts::table.filter(application_drafts::cycle_id.eq(from_cycle_id)),
        )
        .set(application_drafts::cycle_id.eq(to_cycle_id))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(moved as u64)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::draft::DraftFileField;
    use rstest::rstest;

    #[rstest]
    fn drafts_round_trip_through_rows() {
        let draft = ApplicationDraft::builder(Uuid::new_v4(), Uuid::new_v4())
            .field("mission", "Justice")
            .file(DraftFileField::Budget1, "blobs/budget.xlsx")
            .build();

        let decoded = row_to_draft(draft_to_row(&draft)).expect("valid row");
        assert_eq!(decoded, draft);
    }

    #[rstest]
    fn corrupt_file_maps_fail_decoding() {
        let draft = ApplicationDraft::builder(Uuid::new_v4(), Uuid::new_v4()).build();
        let mut row = draft_to_row(&draft);
        row.files = serde_json::json!({"budget9": "blobs/x.xlsx"});
        let err = row_to_draft(row).expect_err("unknown slot");
        assert!(err.contains("budget9"));
    }
}
