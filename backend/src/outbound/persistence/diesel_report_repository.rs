//! PostgreSQL-backed `ReportRepository` implementation using Diesel.
//!
//! Report drafts mirror application drafts: whole-row upserts keyed on the
//! draft id. Submission inserts the report with its answers and deletes the
//! draft in one transaction, and the `(award, report_number)` unique index
//! turns a concurrent double submit into a duplicate error.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{ReportRepository, ReportRepositoryError};
use crate::domain::report::{GranteeReport, ReportAnswer, ReportDraft};

use super::diesel_helpers::{
    cast_count, cast_count_for_db, map_basic_diesel_error, map_basic_pool_error,
};
use super::json_serializers::{json_to_string_map, string_map_to_json};
use super::models::{GranteeReportRow, ReportAnswerRow, ReportDraftRow};
use super::pool::{DbPool, PoolError};
use super::schema::{grantee_reports, report_answers, report_drafts};

/// Diesel-backed implementation of the `ReportRepository` port.
#[derive(Clone)]
pub struct DieselReportRepository {
    pool: DbPool,
}

impl DieselReportRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReportRepositoryError {
    map_basic_pool_error(error, ReportRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReportRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return ReportRepositoryError::duplicate("this report was already submitted");
    }
    map_basic_diesel_error(
        error,
        ReportRepositoryError::query,
        ReportRepositoryError::connection,
    )
}

pub(super) fn row_to_report_draft(row: ReportDraftRow) -> Result<ReportDraft, String> {
    Ok(ReportDraft {
        id: row.id,
        award_id: row.award_id,
        report_number: cast_count(row.report_number),
        created: row.created,
        modified: row.modified,
        modified_by: row.modified_by,
        contents: json_to_string_map(row.contents)?,
        files: json_to_string_map(row.files)?,
    })
}

fn report_draft_to_row(draft: &ReportDraft) -> ReportDraftRow {
    ReportDraftRow {
        id: draft.id,
        award_id: draft.award_id,
        report_number: cast_count_for_db(draft.report_number),
        created: draft.created,
        modified: draft.modified,
        modified_by: draft.modified_by.clone(),
        contents: string_map_to_json(&draft.contents),
        files: string_map_to_json(&draft.files),
    }
}

fn report_to_row(report: &GranteeReport) -> GranteeReportRow {
    GranteeReportRow {
        id: report.id,
        award_id: report.award_id,
        report_number: cast_count_for_db(report.report_number),
        submitted: report.submitted,
    }
}

fn answer_to_row(answer: &ReportAnswer) -> ReportAnswerRow {
    ReportAnswerRow {
        id: answer.id,
        grantee_report_id: answer.grantee_report_id,
        cycle_report_question_id: answer.cycle_report_question_id,
        text: answer.text.clone(),
    }
}

#[async_trait]
impl ReportRepository for DieselReportRepository {
    async fn find_draft(
        &self,
        draft_id: Uuid,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReportDraftRow> = report_drafts::table
            .filter(report_drafts::id.eq(draft_id))
            .select(ReportDraftRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_report_draft)
            .transpose()
            .map_err(ReportRepositoryError::query)
    }

    async fn find_draft_for(
        &self,
        award_id: Uuid,
        report_number: u32,
    ) -> Result<Option<ReportDraft>, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ReportDraftRow> = report_drafts::table
            .filter(report_drafts::award_id.eq(award_id))
            .filter(report_drafts::report_number.eq(cast_count_for_db(report_number)))
            .select(ReportDraftRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_report_draft)
            .transpose()
            .map_err(ReportRepositoryError::query)
    }

    async fn save_draft(&self, draft: &ReportDraft) -> Result<(), ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = report_draft_to_row(draft);
        diesel::insert_into(report_drafts::table)
            .values(&row)
            .on_conflict(report_drafts::id)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn count_submitted(&self, award_id: Uuid) -> Result<u32, ReportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = grantee_reports::table
            .filter(grantee_reports::award_id.eq(award_id))
            .select(count_star())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        // An award owes at most two reports.
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn submit(
        &self,
        report: &GranteeReport,
        answers: &[ReportAnswer],
        draft_id: Uuid,
    ) -> Result<(), ReportRepositoryError> {
        let report_row = report_to_row(report);
        let answer_rows: Vec<ReportAnswerRow> = answers.iter().map(answer_to_row).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(grantee_reports::table)
                    .values(&report_row)
                    .execute(conn)
                    .await?;

                if !answer_rows.is_empty() {
                    diesel::insert_into(report_answers::table)
                        .values(&answer_rows)
                        .execute(conn)
                        .await?;
                }

                diesel::delete(report_drafts::table.filter(report_drafts::id.eq(draft_id)))
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }
}
