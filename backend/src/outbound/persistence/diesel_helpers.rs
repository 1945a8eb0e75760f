//! Shared helpers for Diesel repository implementations.
//!
//! Every repository maps pool and Diesel failures into its own port error
//! enum; the constructors all share the connection/query shape, so the
//! mapping is written once here and closed over the constructors at each
//! call site. Casting helpers bridge the database's signed integer columns
//! and the domain's unsigned counts.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(super) fn map_basic_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub(super) fn map_basic_diesel_error<E, Q, C>(
    error: diesel::result::Error,
    query: Q,
    connection: C,
) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            query("unique constraint violation")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Cast a database count or amount (i32) to the domain's u32.
///
/// Check constraints keep these columns non-negative.
#[expect(
    clippy::cast_sign_loss,
    reason = "counts and amounts are non-negative in the database"
)]
pub(super) fn cast_count(value: i32) -> u32 {
    value as u32
}

/// Cast a domain count or amount (u32) to the database's i32.
#[expect(
    clippy::cast_possible_wrap,
    reason = "counts and amounts stay far below the i32 range"
)]
pub(super) fn cast_count_for_db(value: u32) -> i32 {
    value as i32
}

/// Collect row conversion results, mapping the first error through `map_err`.
pub(super) fn collect_rows<T, E>(
    results: impl Iterator<Item = Result<T, String>>,
    map_err: impl FnOnce(String) -> E,
) -> Result<Vec<T>, E> {
    results.collect::<Result<Vec<_>, _>>().map_err(map_err)
}
