//! Authenticated principals and authorization checks.
//!
//! Authentication itself lives outside this service: the session cookie is
//! written by the identity provider and decoded by the inbound layer. The
//! domain only decides what a principal may touch: organizations own their
//! drafts and applications, staff may act for any organization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Error;

/// The authenticated caller extracted from the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Principal {
    /// Stable identity string, recorded as the autosave writer.
    pub identity: String,
    /// Organization the principal acts for, absent on staff accounts.
    pub organization_id: Option<Uuid>,
    /// Whether the principal has staff privileges.
    pub staff: bool,
}

impl Principal {
    /// A principal acting for an organization.
    #[must_use]
    pub fn organization(identity: impl Into<String>, organization_id: Uuid) -> Self {
        Self {
            identity: identity.into(),
            organization_id: Some(organization_id),
            staff: false,
        }
    }

    /// A staff principal.
    #[must_use]
    pub fn staff(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            organization_id: None,
            staff: true,
        }
    }

    /// The organization this principal acts for.
    pub fn require_organization(&self) -> Result<Uuid, Error> {
        self.organization_id
            .ok_or_else(|| Error::forbidden("An organization account is required"))
    }

    /// Rejects non-staff principals.
    pub fn require_staff(&self) -> Result<(), Error> {
        if self.staff {
            Ok(())
        } else {
            Err(Error::forbidden("Staff access is required"))
        }
    }

    /// Whether the principal may read or write the organization's records.
    #[must_use]
    pub fn can_access_organization(&self, organization_id: Uuid) -> bool {
        self.staff || self.organization_id == Some(organization_id)
    }

    /// Rejects principals without access to the organization's records.
    pub fn require_organization_access(&self, organization_id: Uuid) -> Result<(), Error> {
        if self.can_access_organization(organization_id) {
            Ok(())
        } else {
            Err(Error::forbidden(
                "Caller does not have access to this organization",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn organization_principal_accesses_own_records_only() {
        let own = Uuid::new_v4();
        let other = Uuid::new_v4();
        let principal = Principal::organization("org@example.org", own);

        assert!(principal.can_access_organization(own));
        assert!(!principal.can_access_organization(other));
        assert_eq!(principal.require_organization().expect("own org"), own);

        let err = principal
            .require_organization_access(other)
            .expect_err("other org");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn staff_principal_accesses_everything_but_owns_nothing() {
        let principal = Principal::staff("admin@example.org");

        assert!(principal.can_access_organization(Uuid::new_v4()));
        principal.require_staff().expect("staff");

        let err = principal.require_organization().expect_err("no org");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    fn non_staff_fails_the_staff_check() {
        let principal = Principal::organization("org@example.org", Uuid::new_v4());
        let err = principal.require_staff().expect_err("not staff");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
