//! PostgreSQL-backed `QuestionRepository` implementation using Diesel.
//!
//! Serves the question catalogue for cycle creation. Unknown ids are
//! silently absent from results; the domain validates completeness.

use std::str::FromStr;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{QuestionRepository, QuestionRepositoryError};
use crate::domain::question::{Question, ReportInputType, ReportQuestion};

use super::diesel_helpers::{
    cast_count, collect_rows, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::{QuestionRow, ReportQuestionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{questions, report_questions};

/// Diesel-backed implementation of the `QuestionRepository` port.
#[derive(Clone)]
pub struct DieselQuestionRepository {
    pool: DbPool,
}

impl DieselQuestionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> QuestionRepositoryError {
    map_basic_pool_error(error, QuestionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> QuestionRepositoryError {
    map_basic_diesel_error(
        error,
        QuestionRepositoryError::query,
        QuestionRepositoryError::connection,
    )
}

pub(super) fn row_to_question(row: QuestionRow) -> Question {
    Question {
        id: row.id,
        name: row.name,
        version: row.version,
        text: row.text,
        word_limit: row.word_limit.map(cast_count),
        archived: row.archived,
        created: row.created,
    }
}

pub(super) fn row_to_report_question(row: ReportQuestionRow) -> Result<ReportQuestion, String> {
    let input_type = ReportInputType::from_str(&row.input_type)
        .map_err(|e| format!("report question {}: {e}", row.id))?;
    Ok(ReportQuestion {
        id: row.id,
        name: row.name,
        version: row.version,
        text: row.text,
        input_type,
        word_limit: cast_count(row.word_limit),
        archived: row.archived,
        created: row.created,
    })
}

#[async_trait]
impl QuestionRepository for DieselQuestionRepository {
    async fn find_questions(
        &self,
        question_ids: &[Uuid],
    ) -> Result<Vec<Question>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<QuestionRow> = questions::table
            .filter(questions::id.eq_any(question_ids))
            .select(QuestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_question).collect())
    }

    async fn find_report_questions(
        &self,
        report_question_ids: &[Uuid],
    ) -> Result<Vec<ReportQuestion>, QuestionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<ReportQuestionRow> = report_questions::table
            .filter(report_questions::id.eq_any(report_question_ids))
            .select(ReportQuestionRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        collect_rows(
            rows.into_iter().map(row_to_report_question),
            QuestionRepositoryError::query,
        )
    }
}
