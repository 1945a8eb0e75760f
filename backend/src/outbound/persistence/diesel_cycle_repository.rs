//! PostgreSQL-backed `CycleRepository` implementation using Diesel.
//!
//! Cycle creation persists the cycle and both question join sets in one
//! transaction so a half-assembled cycle can never be observed. Detail
//! assembly joins the catalogue through the join tables in position order.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::cycle::{
    AssembledQuestion, AssembledReportQuestion, CycleDetail, CycleQuestion, CycleReportQuestion,
    CycleType, GrantCycle,
};
use crate::domain::ports::{CycleRepository, CycleRepositoryError};

use super::diesel_helpers::{
    cast_count, cast_count_for_db, collect_rows, map_basic_diesel_error, map_basic_pool_error,
};
use super::diesel_question_repository::{row_to_question, row_to_report_question};
use super::models::{
    CycleQuestionRow, CycleReportQuestionRow, GrantCycleRow, QuestionRow, ReportQuestionRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{cycle_questions, cycle_report_questions, grant_cycles, questions, report_questions};

/// Diesel-backed implementation of the `CycleRepository` port.
#[derive(Clone)]
pub struct DieselCycleRepository {
    pool: DbPool,
}

impl DieselCycleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CycleRepositoryError {
    map_basic_pool_error(error, CycleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CycleRepositoryError {
    map_basic_diesel_error(
        error,
        CycleRepositoryError::query,
        CycleRepositoryError::connection,
    )
}

pub(super) fn row_to_cycle(row: GrantCycleRow) -> Result<GrantCycle, String> {
    let cycle_type = CycleType::from_str(&row.cycle_type)
        .map_err(|e| format!("cycle {}: {e}", row.id))?;
    Ok(GrantCycle {
        id: row.id,
        title: row.title,
        cycle_type,
        open_time: row.open_time,
        close_time: row.close_time,
        info_url: row.info_url,
        private: row.private,
        amount_note: row.amount_note,
    })
}

fn cycle_to_row(cycle: &GrantCycle) -> GrantCycleRow {
    GrantCycleRow {
        id: cycle.id,
        title: cycle.title.clone(),
        cycle_type: cycle.cycle_type.as_str().to_owned(),
        open_time: cycle.open_time,
        close_time: cycle.close_time,
        info_url: cycle.info_url.clone(),
        private: cycle.private,
        amount_note: cycle.amount_note.clone(),
    }
}

fn join_to_row(join: &CycleQuestion) -> CycleQuestionRow {
    CycleQuestionRow {
        id: join.id,
        cycle_id: join.cycle_id,
        question_id: join.question_id,
        position: cast_count_for_db(join.order),
    }
}

fn report_join_to_row(join: &CycleReportQuestion) -> CycleReportQuestionRow {
    CycleReportQuestionRow {
        id: join.id,
        cycle_id: join.cycle_id,
        report_question_id: join.report_question_id,
        position: cast_count_for_db(join.order),
        required: join.required,
    }
}

fn assemble_question((join, question): (CycleQuestionRow, QuestionRow)) -> AssembledQuestion {
    AssembledQuestion {
        cycle_question_id: join.id,
        order: cast_count(join.position),
        question: row_to_question(question),
    }
}

fn assemble_report_question(
    (join, question): (CycleReportQuestionRow, ReportQuestionRow),
) -> Result<AssembledReportQuestion, String> {
    Ok(AssembledReportQuestion {
        cycle_report_question_id: join.id,
        order: cast_count(join.position),
        required: join.required,
        question: row_to_report_question(question)?,
    })
}

#[async_trait]
impl CycleRepository for DieselCycleRepository {
    async fn find(&self, cycle_id: Uuid) -> Result<Option<GrantCycle>, CycleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<GrantCycleRow> = grant_cycles::table
            .filter(grant_cycles::id.eq(cycle_id))
            .select(GrantCycleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_cycle)
            .transpose()
            .map_err(CycleRepositoryError::query)
    }

    async fn list_open(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GrantCycleRow> = grant_cycles::table
            .filter(grant_cycles::open_time.lt(now))
            .filter(grant_cycles::close_time.gt(now))
            .filter(grant_cycles::private.eq(false))
            .order_by(grant_cycles::close_time.asc())
            .select(GrantCycleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows.into_iter().map(row_to_cycle), CycleRepositoryError::query)
    }

    async fn detail(&self, cycle_id: Uuid) -> Result<Option<CycleDetail>, CycleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let cycle_row: Option<GrantCycleRow> = grant_cycles::table
            .filter(grant_cycles::id.eq(cycle_id))
            .select(GrantCycleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        let Some(cycle_row) = cycle_row else {
            return Ok(None);
        };
        let cycle = row_to_cycle(cycle_row).map_err(CycleRepositoryError::query)?;

        let question_rows: Vec<(CycleQuestionRow, QuestionRow)> = cycle_questions::table
            .inner_join(questions::table)
            .filter(cycle_questions::cycle_id.eq(cycle_id))
            .order_by(cycle_questions::position.asc())
            .select((CycleQuestionRow::as_select(), QuestionRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let report_rows: Vec<(CycleReportQuestionRow, ReportQuestionRow)> =
            cycle_report_questions::table
                .inner_join(report_questions::table)
                .filter(cycle_report_questions::cycle_id.eq(cycle_id))
                .order_by(cycle_report_questions::position.asc())
                .select((
                    CycleReportQuestionRow::as_select(),
                    ReportQuestionRow::as_select(),
                ))
                .load(&mut conn)
                .await
                .map_err(map_diesel_error)?;

        let report_questions = collect_rows(
            report_rows.into_iter().map(assemble_report_question),
            CycleRepositoryError::query,
        )?;

        Ok(Some(CycleDetail {
            cycle,
            questions: question_rows.into_iter().map(assemble_question).collect(),
            report_questions,
        }))
    }

    async fn create(
        &self,
        cycle: &GrantCycle,
        questions: &[CycleQuestion],
        report_questions: &[CycleReportQuestion],
    ) -> Result<(), CycleRepositoryError> {
        let cycle_row = cycle_to_row(cycle);
        let question_rows: Vec<CycleQuestionRow> = questions.iter().map(join_to_row).collect();
        let report_rows: Vec<CycleReportQuestionRow> =
            report_questions.iter().map(report_join_to_row).collect();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(grant_cycles::table)
                    .values(&cycle_row)
                    .execute(conn)
                    .await?;

                if !question_rows.is_empty() {
                    diesel::insert_into(cycle_questions::table)
                        .values(&question_rows)
                        .execute(conn)
                        .await?;
                }

                if !report_rows.is_empty() {
                    diesel::insert_into(cycle_report_questions::table)
                        .values(&report_rows)
                        .execute(conn)
                        .await?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn list_recently_closed(
        &self,
        window_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Vec<GrantCycle>, CycleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<GrantCycleRow> = grant_cycles::table
            .filter(grant_cycles::cycle_type.ne(CycleType::Standard.as_str()))
            .filter(grant_cycles::close_time.gt(window_start))
            .filter(grant_cycles::close_time.le(now))
            .order_by(grant_cycles::close_time.asc())
            .select(GrantCycleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(rows.into_iter().map(row_to_cycle), CycleRepositoryError::query)
    }

    async fn successor_exists(
        &self,
        cycle_type: CycleType,
        now: DateTime<Utc>,
    ) -> Result<bool, CycleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            grant_cycles::table
                .filter(grant_cycles::cycle_type.eq(cycle_type.as_str()))
                .filter(grant_cycles::close_time.gt(now)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }
}
