//! Form validation for application and report drafts.
//!
//! The rules mirror the hosted grant form: every narrative question is
//! required, money fields must be whole numbers, the project-support and
//! fiscal-sponsor groups switch on conditionally, and the composite timeline
//! and reference questions enforce their own shape. Failures accumulate into
//! a field-to-message map so the form can annotate every input in one pass.

use std::collections::BTreeMap;

use formenc::{Reference, ReferenceList, Timeline, TimelineQuarter};
use serde_json::json;

use super::Error;
use super::application::SupportType;
use super::attachments;
use super::cycle::{AssembledReportQuestion, CycleDetail};
use super::draft::DraftFileField;
use super::question::{Question, ReportInputType};
use super::wordcount;

/// Message for a missing required field.
pub const REQUIRED: &str = "This field is required.";
/// Message for project fields left blank while project support is requested.
pub const REQUIRED_FOR_PROJECT_SUPPORT: &str =
    "This field is required when applying for project support.";
/// Message for a timeline quarter with some but not all columns filled.
pub const TIMELINE_INCOMPLETE: &str =
    "All three columns are required for each quarter that you include in your timeline.";
/// Message for an unusable collaboration reference entry.
pub const REFERENCE_INCOMPLETE: &str =
    "Please include a name, organization, and phone or email for each reference.";
/// Message for an unusable entry in an optional reference list.
pub const OPTIONAL_REFERENCE_INCOMPLETE: &str =
    "Please include a name, organization, and phone or email for each reference you include.";
/// Message for a numeric field that does not parse as a whole number.
pub const WHOLE_NUMBER: &str = "Enter a whole number.";
/// Message for a choice field carrying an unrecognised value.
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Word limit on the organization mission statement.
pub const MISSION_WORD_LIMIT: u32 = 150;
/// Word limit on the grant-request summary.
pub const GRANT_REQUEST_WORD_LIMIT: u32 = 100;

/// Typed text fields every application must fill.
const REQUIRED_TEXT_FIELDS: [&str; 13] = [
    "address",
    "city",
    "state",
    "zip",
    "telephone_number",
    "email_address",
    "status",
    "ein",
    "mission",
    "start_year",
    "grant_request",
    "contact_person",
    "contact_person_title",
];

/// Typed fields that must parse as whole numbers.
const REQUIRED_NUMBER_FIELDS: [&str; 4] =
    ["founded", "budget_last", "budget_current", "amount_requested"];

/// Fiscal-sponsor text fields; filling any one requires the whole group.
const FISCAL_TEXT_FIELDS: [&str; 8] = [
    "fiscal_org",
    "fiscal_person",
    "fiscal_telephone",
    "fiscal_email",
    "fiscal_address",
    "fiscal_city",
    "fiscal_state",
    "fiscal_zip",
];

/// Renders the word-limit failure for a field.
#[must_use]
pub fn word_limit_message(limit: u32, count: usize) -> String {
    format!("This field has a maximum word count of {limit} (current count: {count})")
}

/// Accumulated field-level validation failures.
///
/// Keeps the first message recorded per field, ordered by field name.
///
/// # Examples
/// ```
/// use backend::domain::validation::{FieldErrors, REQUIRED};
///
/// let mut errors = FieldErrors::new();
/// errors.insert("city", REQUIRED);
/// errors.insert("city", "ignored: a message is already recorded");
/// assert_eq!(errors.message("city"), Some(REQUIRED));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, String>,
}

impl FieldErrors {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`, keeping any earlier message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// True when no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with a recorded failure.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The message recorded for `field`, if any.
    #[must_use]
    pub fn message(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Field-to-message view in field order.
    #[must_use]
    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Converts into a request error carrying the field map, or `Ok` when
    /// nothing was recorded.
    ///
    /// # Errors
    /// Returns an invalid-request [`Error`] whose details hold the
    /// field-to-message map when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::invalid_request("Validation failed")
                .with_details(json!({ "fields": self.errors })))
        }
    }
}

/// Validates draft contents and file references against a cycle's form.
///
/// Returns every failure at once so the form can annotate each field.
#[must_use]
pub fn validate_application(
    contents: &BTreeMap<String, String>,
    files: &BTreeMap<DraftFileField, String>,
    detail: &CycleDetail,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for field in REQUIRED_TEXT_FIELDS {
        if is_blank(contents, field) {
            errors.insert(field, REQUIRED);
        }
    }
    for field in REQUIRED_NUMBER_FIELDS {
        check_whole_number(contents, field, true, &mut errors);
    }
    check_word_limit(contents, "mission", MISSION_WORD_LIMIT, &mut errors);
    check_word_limit(contents, "grant_request", GRANT_REQUEST_WORD_LIMIT, &mut errors);

    check_project_support(contents, files, detail, &mut errors);
    check_fiscal_group(contents, files, &mut errors);

    for assembled in &detail.questions {
        check_narrative(contents, &assembled.question, &mut errors);
    }

    for field in detail.cycle.cycle_type.required_file_fields() {
        if !has_file(files, *field) {
            errors.insert(field.as_str(), REQUIRED);
        }
    }

    errors
}

/// Validates report draft contents and files against the cycle's report form.
#[must_use]
pub fn validate_report(
    contents: &BTreeMap<String, String>,
    files: &BTreeMap<String, String>,
    questions: &[AssembledReportQuestion],
) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for assembled in questions {
        let question = &assembled.question;
        let name = question.name.as_str();
        match question.input_type {
            ReportInputType::Text => {
                if is_blank(contents, name) {
                    if assembled.required {
                        errors.insert(name, REQUIRED);
                    }
                } else {
                    check_word_limit(contents, name, question.word_limit, &mut errors);
                }
            }
            ReportInputType::Number => {
                check_whole_number(contents, name, assembled.required, &mut errors);
            }
            ReportInputType::File | ReportInputType::Photo => {
                let reference = files.get(name).map(String::as_str).unwrap_or("");
                if reference.is_empty() {
                    if assembled.required {
                        errors.insert(name, REQUIRED);
                    }
                    continue;
                }
                let outcome = if question.input_type == ReportInputType::Photo {
                    attachments::validate_photo(reference)
                } else {
                    attachments::validate(reference)
                };
                if let Err(problem) = outcome {
                    errors.insert(name, problem.to_string());
                }
            }
        }
    }
    errors
}

fn field_value<'a>(contents: &'a BTreeMap<String, String>, field: &str) -> &'a str {
    contents.get(field).map_or("", String::as_str)
}

fn is_blank(contents: &BTreeMap<String, String>, field: &str) -> bool {
    field_value(contents, field).trim().is_empty()
}

fn has_file(files: &BTreeMap<DraftFileField, String>, field: DraftFileField) -> bool {
    files.get(&field).is_some_and(|reference| !reference.is_empty())
}

fn check_whole_number(
    contents: &BTreeMap<String, String>,
    field: &str,
    required: bool,
    errors: &mut FieldErrors,
) {
    let value = field_value(contents, field).trim();
    if value.is_empty() {
        if required {
            errors.insert(field, REQUIRED);
        }
        return;
    }
    if value.parse::<u32>().is_err() {
        errors.insert(field, WHOLE_NUMBER);
    }
}

fn check_word_limit(
    contents: &BTreeMap<String, String>,
    field: &str,
    limit: u32,
    errors: &mut FieldErrors,
) {
    let value = field_value(contents, field);
    if !wordcount::within_limit(value, limit as usize) {
        errors.insert(field, word_limit_message(limit, wordcount::word_count(value)));
    }
}

/// The project-support group: the choice itself is required on cycle types
/// that show it, and choosing project support requires the title, budget
/// figure, and budget file.
fn check_project_support(
    contents: &BTreeMap<String, String>,
    files: &BTreeMap<DraftFileField, String>,
    detail: &CycleDetail,
    errors: &mut FieldErrors,
) {
    let raw = field_value(contents, "support_type").trim();
    if raw.is_empty() {
        if detail.cycle.cycle_type.shows_project_support() {
            errors.insert("support_type", REQUIRED);
        }
        return;
    }
    let Ok(support_type) = raw.parse::<SupportType>() else {
        errors.insert("support_type", INVALID_CHOICE);
        return;
    };
    if support_type != SupportType::Project {
        return;
    }
    if is_blank(contents, "project_title") {
        errors.insert("project_title", REQUIRED_FOR_PROJECT_SUPPORT);
    }
    if is_blank(contents, "project_budget") {
        errors.insert("project_budget", REQUIRED_FOR_PROJECT_SUPPORT);
    } else {
        check_whole_number(contents, "project_budget", false, errors);
    }
    if !has_file(files, DraftFileField::ProjectBudgetFile) {
        errors.insert(
            DraftFileField::ProjectBudgetFile.as_str(),
            REQUIRED_FOR_PROJECT_SUPPORT,
        );
    }
}

/// The fiscal-sponsor group: any filled text field requires the whole group,
/// letter included. The letter alone does not trigger the group.
fn check_fiscal_group(
    contents: &BTreeMap<String, String>,
    files: &BTreeMap<DraftFileField, String>,
    errors: &mut FieldErrors,
) {
    let triggered = FISCAL_TEXT_FIELDS
        .iter()
        .any(|field| !is_blank(contents, field));
    if !triggered {
        return;
    }
    for field in FISCAL_TEXT_FIELDS {
        if is_blank(contents, field) {
            errors.insert(field, REQUIRED);
        }
    }
    if !has_file(files, DraftFileField::FiscalLetter) {
        errors.insert(DraftFileField::FiscalLetter.as_str(), REQUIRED);
    }
}

fn check_narrative(contents: &BTreeMap<String, String>, question: &Question, errors: &mut FieldErrors) {
    let name = question.name.as_str();
    if name == "timeline" {
        check_timeline(contents, name, errors);
        return;
    }
    if name.ends_with("_references") {
        check_references(contents, name, errors);
        return;
    }
    if is_blank(contents, name) {
        errors.insert(name, REQUIRED);
        return;
    }
    if let Some(limit) = question.word_limit.filter(|_| question.uses_word_limit()) {
        check_word_limit(contents, name, limit, errors);
    }
}

/// Quarter one must be filled; any later quarter may be blank or complete
/// but never partial.
fn check_timeline(contents: &BTreeMap<String, String>, field: &str, errors: &mut FieldErrors) {
    let timeline = Timeline::from_flat(contents, field);
    let quarters = timeline.quarters();
    if quarters.first().is_some_and(TimelineQuarter::is_blank) {
        errors.insert(field, REQUIRED);
    }
    if quarters
        .iter()
        .any(|quarter| !quarter.is_blank() && !quarter.is_complete())
    {
        errors.insert(field, TIMELINE_INCOMPLETE);
    }
}

/// Every non-blank reference entry needs a name, an organization, and at
/// least one contact method. Collaboration references additionally need at
/// least one entry; the racial-justice list may be left entirely blank.
fn check_references(contents: &BTreeMap<String, String>, field: &str, errors: &mut FieldErrors) {
    let references = ReferenceList::from_flat(contents, field);
    let optional = field == "racial_justice_references";
    let message = if optional {
        OPTIONAL_REFERENCE_INCOMPLETE
    } else {
        REFERENCE_INCOMPLETE
    };
    let usable = |reference: &Reference| {
        !reference.name.is_empty() && !reference.org.is_empty() && reference.has_contact_method()
    };
    if references
        .references()
        .iter()
        .any(|reference| !reference.is_blank() && !usable(reference))
    {
        errors.insert(field, message);
        return;
    }
    if !optional && references.is_blank() {
        errors.insert(field, message);
    }
}
