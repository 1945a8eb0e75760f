//! PostgreSQL-backed `OrganizationRepository` implementation using Diesel.
//!
//! Organizations are read-mostly here: the cached profile is refreshed only
//! inside the application submission transaction, which the application
//! repository owns.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::organization::Organization;
use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};

use super::diesel_helpers::{map_basic_diesel_error, map_basic_pool_error};
use super::json_serializers::json_to_profile;
use super::models::OrganizationRow;
use super::pool::{DbPool, PoolError};
use super::schema::organizations;

/// Diesel-backed implementation of the `OrganizationRepository` port.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrganizationRepositoryError {
    map_basic_pool_error(error, OrganizationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> OrganizationRepositoryError {
    map_basic_diesel_error(
        error,
        OrganizationRepositoryError::query,
        OrganizationRepositoryError::connection,
    )
}

pub(super) fn row_to_organization(row: OrganizationRow) -> Result<Organization, String> {
    Ok(Organization {
        id: row.id,
        name: row.name,
        email: row.email,
        profile: json_to_profile(row.profile)?,
    })
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn find(
        &self,
        organization_id: Uuid,
    ) -> Result<Option<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<OrganizationRow> = organizations::table
            .filter(organizations::id.eq(organization_id))
            .select(OrganizationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_organization)
            .transpose()
            .map_err(OrganizationRepositoryError::query)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert!(matches!(
            err,
            OrganizationRepositoryError::Connection { .. }
        ));
        assert!(err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn rows_decode_their_cached_profile() {
        let row = OrganizationRow {
            id: Uuid::new_v4(),
            name: "Mutual Aid Network".to_owned(),
            email: Some("org@example.org".to_owned()),
            profile: serde_json::json!({}),
        };
        let err = row_to_organization(row).expect_err("empty object lacks profile fields");
        assert!(err.contains("profile decode"));
    }
}
