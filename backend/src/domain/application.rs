//! Submitted applications: the typed, immutable result of a draft.
//!
//! Submission converts a draft's untyped contents into this record exactly
//! once per `(organization, cycle)`. After that the row only changes through
//! staff correction or a staff revert, which regenerates a draft and removes
//! the submission in the same transaction.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::draft::DraftFileField;

/// The kind of funding an application asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportType {
    /// Unrestricted operating support.
    General,
    /// Support tied to a named project with its own budget.
    Project,
}

impl SupportType {
    /// Returns the stored string representation.
    ///
    /// These strings appear verbatim in archived form data, so they stay
    /// spelled exactly as the historical choices were.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::application::SupportType;
    /// assert_eq!(SupportType::Project.as_str(), "Project support");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "General support",
            Self::Project => "Project support",
        }
    }
}

impl std::fmt::Display for SupportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown support type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSupportTypeError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseSupportTypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown support type: {}", self.input)
    }
}

impl std::error::Error for ParseSupportTypeError {}

impl std::str::FromStr for SupportType {
    type Err = ParseSupportTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "General support" => Ok(Self::General),
            "Project support" => Ok(Self::Project),
            _ => Err(ParseSupportTypeError {
                input: s.to_owned(),
            }),
        }
    }
}

/// A fully validated, typed grant application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SubmittedApplication {
    /// Application row id.
    pub id: Uuid,
    /// Submitting organization.
    pub organization_id: Uuid,
    /// Cycle applied to; unique together with the organization.
    pub cycle_id: Uuid,
    /// Moment of submission.
    pub submission_time: DateTime<Utc>,
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
    /// Fax number, if any.
    pub fax_number: Option<String>,
    /// Contact email address.
    pub email_address: String,
    /// Website, if any.
    pub website: Option<String>,
    /// Legal status, e.g. `501c3`.
    pub status: String,
    /// Organization or fiscal sponsor EIN.
    pub ein: String,
    /// Year founded.
    pub founded: u32,
    /// Mission statement.
    pub mission: String,
    /// Previous grants awarded, free text.
    pub previous_grants: Option<String>,
    /// Start date of the fiscal year, free text.
    pub start_year: String,
    /// Budget for the last fiscal year, whole dollars.
    pub budget_last: u32,
    /// Budget for the current fiscal year, whole dollars.
    pub budget_current: u32,
    /// Summary of the grant request.
    pub grant_request: String,
    /// Contact person for this application.
    pub contact_person: String,
    /// Contact person's title.
    pub contact_person_title: String,
    /// Grant period when it differs from the fiscal year.
    pub grant_period: Option<String>,
    /// Amount requested, whole dollars.
    pub amount_requested: u32,
    /// General or project support; blank on short forms.
    pub support_type: Option<SupportType>,
    /// Project title, required for project support.
    pub project_title: Option<String>,
    /// Project budget, required for project support.
    pub project_budget: Option<u32>,
    /// Fiscal sponsor organization name.
    pub fiscal_org: Option<String>,
    /// Fiscal sponsor contact person.
    pub fiscal_person: Option<String>,
    /// Fiscal sponsor telephone.
    pub fiscal_telephone: Option<String>,
    /// Fiscal sponsor email.
    pub fiscal_email: Option<String>,
    /// Fiscal sponsor address.
    pub fiscal_address: Option<String>,
    /// Fiscal sponsor city.
    pub fiscal_city: Option<String>,
    /// Fiscal sponsor state.
    pub fiscal_state: Option<String>,
    /// Fiscal sponsor postal code.
    pub fiscal_zip: Option<String>,
    /// Blob references copied from the draft, keyed by slot.
    pub files: BTreeMap<DraftFileField, String>,
}

impl SubmittedApplication {
    /// Whether the application asks for project-specific funds.
    #[must_use]
    pub fn requests_project_support(&self) -> bool {
        self.support_type == Some(SupportType::Project)
    }

    /// Whether any fiscal sponsor information was supplied.
    #[must_use]
    pub fn has_fiscal_sponsor(&self) -> bool {
        [
            &self.fiscal_org,
            &self.fiscal_person,
            &self.fiscal_telephone,
            &self.fiscal_email,
            &self.fiscal_address,
            &self.fiscal_city,
            &self.fiscal_state,
            &self.fiscal_zip,
        ]
        .into_iter()
        .any(|field| field.as_deref().is_some_and(|value| !value.is_empty()))
            || self.files.contains_key(&DraftFileField::FiscalLetter)
    }
}

/// One narrative answer on a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct NarrativeAnswer {
    /// Answer row id.
    pub id: Uuid,
    /// Owning application.
    pub application_id: Uuid,
    /// Cycle question answered; unique together with the application.
    pub cycle_question_id: Uuid,
    /// Plain text, or JSON for composite questions.
    pub text: String,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::test_support::fixtures::sample_application;
    use rstest::rstest;

    #[rstest]
    #[case::general("General support", SupportType::General)]
    #[case::project("Project support", SupportType::Project)]
    fn support_type_parses_stored_strings(#[case] input: &str, #[case] expected: SupportType) {
        let parsed: SupportType = input.parse().expect("valid support type");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case::lowercase("general support")]
    #[case::short("General")]
    #[case::empty("")]
    fn support_type_rejects_unknown_strings(#[case] input: &str) {
        let result: Result<SupportType, _> = input.parse();
        assert!(result.is_err());
    }

    #[rstest]
    fn project_support_is_flagged() {
        let mut application = sample_application();
        application.support_type = Some(SupportType::Project);
        assert!(application.requests_project_support());

        application.support_type = Some(SupportType::General);
        assert!(!application.requests_project_support());

        application.support_type = None;
        assert!(!application.requests_project_support());
    }

    #[rstest]
    fn fiscal_sponsor_detected_from_any_field() {
        let mut application = sample_application();
        assert!(!application.has_fiscal_sponsor());

        application.fiscal_city = Some("Olympia".to_owned());
        assert!(application.has_fiscal_sponsor());
    }

    #[rstest]
    fn fiscal_sponsor_detected_from_letter_alone() {
        let mut application = sample_application();
        application
            .files
            .insert(DraftFileField::FiscalLetter, "blobs/letter.pdf".to_owned());
        assert!(application.has_fiscal_sponsor());
    }

    #[rstest]
    fn empty_strings_do_not_imply_a_sponsor() {
        let mut application = sample_application();
        application.fiscal_org = Some(String::new());
        assert!(!application.has_fiscal_sponsor());
    }
}
