//! PostgreSQL-backed `AwardRepository` implementation using Diesel.
//!
//! The unique index on `application_id` enforces one award per application;
//! a violated insert surfaces as a duplicate error for the service to turn
//! into a conflict.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::award::Award;
use crate::domain::ports::{AwardRepository, AwardRepositoryError};

use super::diesel_helpers::{
    cast_count, cast_count_for_db, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::AwardRow;
use super::pool::{DbPool, PoolError};
use super::schema::awards;

/// Diesel-backed implementation of the `AwardRepository` port.
#[derive(Clone)]
pub struct DieselAwardRepository {
    pool: DbPool,
}

impl DieselAwardRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AwardRepositoryError {
    map_basic_pool_error(error, AwardRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AwardRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return AwardRepositoryError::duplicate("an award already exists for this application");
    }
    map_basic_diesel_error(
        error,
        AwardRepositoryError::query,
        AwardRepositoryError::connection,
    )
}

pub(super) fn row_to_award(row: AwardRow) -> Award {
    Award {
        id: row.id,
        application_id: row.application_id,
        created: row.created,
        amount: cast_count(row.amount),
        check_number: row.check_number.map(cast_count),
        check_mailed: row.check_mailed,
        second_amount: row.second_amount.map(cast_count),
        second_check_number: row.second_check_number.map(cast_count),
        second_check_mailed: row.second_check_mailed,
        agreement_mailed: row.agreement_mailed,
        agreement_returned: row.agreement_returned,
        approved: row.approved,
        first_report_due: row.first_report_due,
        second_report_due: row.second_report_due,
    }
}

fn award_to_row(award: &Award) -> AwardRow {
    AwardRow {
        id: award.id,
        application_id: award.application_id,
        created: award.created,
        amount: cast_count_for_db(award.amount),
        check_number: award.check_number.map(cast_count_for_db),
        check_mailed: award.check_mailed,
        second_amount: award.second_amount.map(cast_count_for_db),
        second_check_number: award.second_check_number.map(cast_count_for_db),
        second_check_mailed: award.second_check_mailed,
        agreement_mailed: award.agreement_mailed,
        agreement_returned: award.agreement_returned,
        approved: award.approved,
        first_report_due: award.first_report_due,
        second_report_due: award.second_report_due,
    }
}

#[async_trait]
impl AwardRepository for DieselAwardRepository {
    async fn find(&self, award_id: Uuid) -> Result<Option<Award>, AwardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AwardRow> = awards::table
            .filter(awards::id.eq(award_id))
            .select(AwardRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_award))
    }

    async fn find_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<Award>, AwardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AwardRow> = awards::table
            .filter(awards::application_id.eq(application_id))
            .select(AwardRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_award))
    }

    async fn create(&self, award: &Award) -> Result<(), AwardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(awards::table)
            .values(award_to_row(award))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_with_report_due_on(
        &self,
        dates: &[NaiveDate],
    ) -> Result<Vec<Award>, AwardRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AwardRow> = awards::table
            .filter(
                awards::first_report_due
                    .eq_any(dates)
                    .or(awards::second_report_due.eq_any(dates.iter().map(|d| Some(*d)))),
            )
            .order_by(awards::created.asc())
            .select(AwardRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(row_to_award).collect())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[rstest]
    fn awards_round_trip_through_rows() {
        let award = Award::builder(Uuid::new_v4(), 15_000, date(2025, 3, 1))
            .second_year(10_000, date(2026, 3, 1))
            .check(1101, date(2024, 2, 2))
            .build();
        assert_eq!(row_to_award(award_to_row(&award)), award);
    }

    #[rstest]
    fn unique_violations_become_duplicates() {
        let err = map_diesel_error(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        ));
        assert!(matches!(err, AwardRepositoryError::Duplicate { .. }));
    }
}
