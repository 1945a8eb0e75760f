//! PostgreSQL-backed `NotificationRepository` implementation using Diesel.
//!
//! The ledger is append-only and only ever queried for existence, which is
//! what gives reminder emails at-least-once delivery without duplicates.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::jobs::{NotificationKind, NotificationRecord};
use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NotificationRecordRow;
use super::pool::{DbPool, PoolError};
use super::schema::notification_records;

/// Diesel-backed implementation of the `NotificationRepository` port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> NotificationRepositoryError {
    map_basic_pool_error(error, NotificationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_basic_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn record_to_row(record: &NotificationRecord) -> NotificationRecordRow {
    NotificationRecordRow {
        id: record.id,
        recipient: record.recipient.clone(),
        kind: record.kind.as_str().to_owned(),
        due_date: record.due_date,
        sent_at: record.sent_at,
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn was_sent(
        &self,
        recipient: &str,
        kind: NotificationKind,
        due_date: NaiveDate,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            notification_records::table
                .filter(notification_records::recipient.eq(recipient))
                .filter(notification_records::kind.eq(kind.as_str()))
                .filter(notification_records::due_date.eq(due_date)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn record(
        &self,
        record: &NotificationRecord,
    ) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(notification_records::table)
            .values(record_to_row(record))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
