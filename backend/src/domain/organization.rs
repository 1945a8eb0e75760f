//! Organizations and their cached application profile.
//!
//! The profile is not authored directly: it is a cache of the matching
//! fields from the organization's most recent submitted application,
//! refreshed inside the submission transaction. A populated `mission` marks
//! the profile as usable for pre-filling new drafts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::SubmittedApplication;
use super::draft::DraftFileField;

/// Profile fields cached from the latest submission.
///
/// All values are stored form-shaped (strings, empty meaning unset) so they
/// can pre-fill a draft's contents without conversion. The fiscal letter is
/// a blob reference, copied separately from the text fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct OrganizationProfile {
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    /// Postal code.
    pub zip: String,
    /// Daytime telephone number.
    pub telephone_number: String,
    /// Fax number.
    pub fax_number: String,
    /// Contact email address.
    pub email_address: String,
    /// Website.
    pub website: String,
    /// Legal status.
    pub status: String,
    /// Organization or fiscal sponsor EIN.
    pub ein: String,
    /// Year founded.
    pub founded: String,
    /// Mission statement; non-empty marks the profile usable.
    pub mission: String,
    /// Contact person.
    pub contact_person: String,
    /// Contact person's title.
    pub contact_person_title: String,
    /// Fiscal sponsor organization name.
    pub fiscal_org: String,
    /// Fiscal sponsor contact person.
    pub fiscal_person: String,
    /// Fiscal sponsor telephone.
    pub fiscal_telephone: String,
    /// Fiscal sponsor email.
    pub fiscal_email: String,
    /// Fiscal sponsor address.
    pub fiscal_address: String,
    /// Fiscal sponsor city.
    pub fiscal_city: String,
    /// Fiscal sponsor state.
    pub fiscal_state: String,
    /// Fiscal sponsor postal code.
    pub fiscal_zip: String,
    /// Blob reference for the fiscal sponsor letter.
    pub fiscal_letter: Option<String>,
}

impl OrganizationProfile {
    /// Snapshot the profile-named fields from a submitted application.
    #[must_use]
    pub fn from_application(application: &SubmittedApplication) -> Self {
        let text = |field: &Option<String>| field.clone().unwrap_or_default();
        Self {
            address: application.address.clone(),
            city: application.city.clone(),
            state: application.state.clone(),
            zip: application.zip.clone(),
            telephone_number: application.telephone_number.clone(),
            fax_number: text(&application.fax_number),
            email_address: application.email_address.clone(),
            website: text(&application.website),
            status: application.status.clone(),
            ein: application.ein.clone(),
            founded: application.founded.to_string(),
            mission: application.mission.clone(),
            contact_person: application.contact_person.clone(),
            contact_person_title: application.contact_person_title.clone(),
            fiscal_org: text(&application.fiscal_org),
            fiscal_person: text(&application.fiscal_person),
            fiscal_telephone: text(&application.fiscal_telephone),
            fiscal_email: text(&application.fiscal_email),
            fiscal_address: text(&application.fiscal_address),
            fiscal_city: text(&application.fiscal_city),
            fiscal_state: text(&application.fiscal_state),
            fiscal_zip: text(&application.fiscal_zip),
            fiscal_letter: application.files.get(&DraftFileField::FiscalLetter).cloned(),
        }
    }

    /// Whether the profile holds enough data to pre-fill a draft.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.mission.is_empty()
    }

    /// Renders the text fields as draft contents, keyed by form field name.
    ///
    /// The fiscal letter is excluded; file references are attached to the
    /// draft's file slots, not its contents.
    #[must_use]
    pub fn autofill_contents(&self) -> BTreeMap<String, String> {
        let mut contents = BTreeMap::new();
        let mut put = |name: &str, value: &str| {
            contents.insert(name.to_owned(), value.to_owned());
        };
        put("address", &self.address);
        put("city", &self.city);
        put("state", &self.state);
        put("zip", &self.zip);
        put("telephone_number", &self.telephone_number);
        put("fax_number", &self.fax_number);
        put("email_address", &self.email_address);
        put("website", &self.website);
        put("status", &self.status);
        put("ein", &self.ein);
        put("founded", &self.founded);
        put("mission", &self.mission);
        put("contact_person", &self.contact_person);
        put("contact_person_title", &self.contact_person_title);
        put("fiscal_org", &self.fiscal_org);
        put("fiscal_person", &self.fiscal_person);
        put("fiscal_telephone", &self.fiscal_telephone);
        put("fiscal_email", &self.fiscal_email);
        put("fiscal_address", &self.fiscal_address);
        put("fiscal_city", &self.fiscal_city);
        put("fiscal_state", &self.fiscal_state);
        put("fiscal_zip", &self.fiscal_zip);
        contents
    }
}

/// A grantee organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct Organization {
    /// Organization row id.
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Login email; absent for staff-created, unregistered organizations.
    pub email: Option<String>,
    /// Cached profile from the latest submission.
    pub profile: OrganizationProfile,
}

impl Organization {
    /// Preferred contact address: the login email, falling back to the
    /// profile's contact address when populated.
    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .or_else(|| {
                let address = self.profile.email_address.as_str();
                (!address.is_empty()).then_some(address)
            })
    }
}
