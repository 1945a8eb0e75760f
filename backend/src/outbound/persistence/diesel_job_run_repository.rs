//! PostgreSQL-backed `JobRunRepository` implementation using Diesel.
//!
//! The `(kind, run_date)` unique index is the idempotency guarantee: a
//! concurrent duplicate run fails its `record` insert instead of running
//! twice.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::jobs::{JobKind, JobRun};
use crate::domain::ports::{JobRunRepository, JobRunRepositoryError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::JobRunRow;
use super::pool::{DbPool, PoolError};
use super::schema::job_runs;

/// Diesel-backed implementation of the `JobRunRepository` port.
#[derive(Clone)]
pub struct DieselJobRunRepository {
    pool: DbPool,
}

impl DieselJobRunRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> JobRunRepositoryError {
    map_basic_pool_error(error, JobRunRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> JobRunRepositoryError {
    map_basic_diesel_error(
        error,
        JobRunRepositoryError::query,
        JobRunRepositoryError::connection,
    )
}

pub(super) fn row_to_run(row: JobRunRow) -> Result<JobRun, String> {
    let kind =
        JobKind::from_str(&row.kind).map_err(|e| format!("job run {}: {e}", row.id))?;
    Ok(JobRun {
        id: row.id,
        kind,
        run_date: row.run_date,
        started_at: row.started_at,
        outcome: row.outcome,
    })
}

fn run_to_row(run: &JobRun) -> JobRunRow {
    JobRunRow {
        id: run.id,
        kind: run.kind.as_str().to_owned(),
        run_date: run.run_date,
        started_at: run.started_at,
        outcome: run.outcome.clone(),
    }
}

#[async_trait]
impl JobRunRepository for DieselJobRunRepository {
    async fn find_run(
        &self,
        kind: JobKind,
        run_date: NaiveDate,
    ) -> Result<Option<JobRun>, JobRunRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<JobRunRow> = job_runs::table
            .filter(job_runs::kind.eq(kind.as_str()))
            .filter(job_runs::run_date.eq(run_date))
            .select(JobRunRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_run)
            .transpose()
            .map_err(JobRunRepositoryError::query)
    }

    async fn record(&self, run: &JobRun) -> Result<(), JobRunRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(job_runs::table)
            .values(run_to_row(run))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
