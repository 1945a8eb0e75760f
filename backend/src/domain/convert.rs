//! Lossless conversion between draft contents and typed submissions.
//!
//! Submitting validates the flat contents map and lifts it into a
//! [`SubmittedApplication`] plus one answer per cycle question, with the
//! composite timeline and reference values serialised as JSON text.
//! Reverting is the exact inverse for every non-file field: typed values are
//! stringified, composite answers re-expand into their flat keys, and file
//! references are copied untouched in both directions. A draft produced by
//! reverting a submission renders identically to the draft that produced it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use formenc::{ReferenceList, Timeline};
use uuid::Uuid;

use super::Error;
use super::application::{NarrativeAnswer, SubmittedApplication, SupportType};
use super::cycle::CycleDetail;
use super::draft::ApplicationDraft;
use super::validation;

/// A typed submission plus its ordered answers, ready to persist atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedSubmission {
    /// The typed application row.
    pub application: SubmittedApplication,
    /// One answer per cycle question, in the cycle's question order.
    pub answers: Vec<NarrativeAnswer>,
}

/// Validates a draft against its cycle and converts it into a submission.
///
/// # Errors
/// Returns an invalid-request [`Error`] carrying the field-to-message map
/// when validation fails, or an internal error when contents that passed
/// validation still fail typed extraction.
pub fn to_submission(
    draft: &ApplicationDraft,
    detail: &CycleDetail,
    submission_time: DateTime<Utc>,
) -> Result<ConvertedSubmission, Error> {
    validation::validate_application(&draft.contents, &draft.files, detail).into_result()?;

    let contents = &draft.contents;
    let application = SubmittedApplication {
        id: Uuid::new_v4(),
        organization_id: draft.organization_id,
        cycle_id: draft.cycle_id,
        submission_time,
        address: text(contents, "address"),
        city: text(contents, "city"),
        state: text(contents, "state"),
        zip: text(contents, "zip"),
        telephone_number: text(contents, "telephone_number"),
        fax_number: optional(contents, "fax_number"),
        email_address: text(contents, "email_address"),
        website: optional(contents, "website"),
        status: text(contents, "status"),
        ein: text(contents, "ein"),
        founded: number(contents, "founded")?,
        mission: text(contents, "mission"),
        previous_grants: optional(contents, "previous_grants"),
        start_year: text(contents, "start_year"),
        budget_last: number(contents, "budget_last")?,
        budget_current: number(contents, "budget_current")?,
        grant_request: text(contents, "grant_request"),
        contact_person: text(contents, "contact_person"),
        contact_person_title: text(contents, "contact_person_title"),
        grant_period: optional(contents, "grant_period"),
        amount_requested: number(contents, "amount_requested")?,
        support_type: support_type(contents)?,
        project_title: optional(contents, "project_title"),
        project_budget: optional_number(contents, "project_budget")?,
        fiscal_org: optional(contents, "fiscal_org"),
        fiscal_person: optional(contents, "fiscal_person"),
        fiscal_telephone: optional(contents, "fiscal_telephone"),
        fiscal_email: optional(contents, "fiscal_email"),
        fiscal_address: optional(contents, "fiscal_address"),
        fiscal_city: optional(contents, "fiscal_city"),
        fiscal_state: optional(contents, "fiscal_state"),
        fiscal_zip: optional(contents, "fiscal_zip"),
        files: draft.files.clone(),
    };

    let mut answers = Vec::with_capacity(detail.questions.len());
    for assembled in &detail.questions {
        let name = assembled.question.name.as_str();
        let answer_text =
            composite_to_json(contents, name).unwrap_or_else(|| text(contents, name));
        answers.push(NarrativeAnswer {
            id: Uuid::new_v4(),
            application_id: application.id,
            cycle_question_id: assembled.cycle_question_id,
            text: answer_text,
        });
    }

    Ok(ConvertedSubmission {
        application,
        answers,
    })
}

/// Converts a submission and its answers back into a draft.
///
/// Every typed field is stringified into `contents` (absent optionals become
/// empty strings), composite answers re-expand into their full flat key
/// sets, and file references are copied onto the draft's file slots. The
/// returned draft carries a fresh id and no last-writer mark.
///
/// # Errors
/// Returns an internal [`Error`] when an answer references a question the
/// cycle does not carry or a stored composite answer fails to decode.
pub fn to_draft(
    application: &SubmittedApplication,
    answers: &[NarrativeAnswer],
    detail: &CycleDetail,
    now: DateTime<Utc>,
) -> Result<ApplicationDraft, Error> {
    let mut contents = BTreeMap::new();
    put(&mut contents, "address", application.address.clone());
    put(&mut contents, "city", application.city.clone());
    put(&mut contents, "state", application.state.clone());
    put(&mut contents, "zip", application.zip.clone());
    put(
        &mut contents,
        "telephone_number",
        application.telephone_number.clone(),
    );
    put_optional(&mut contents, "fax_number", application.fax_number.as_deref());
    put(
        &mut contents,
        "email_address",
        application.email_address.clone(),
    );
    put_optional(&mut contents, "website", application.website.as_deref());
    put(&mut contents, "status", application.status.clone());
    put(&mut contents, "ein", application.ein.clone());
    put(&mut contents, "founded", application.founded.to_string());
    put(&mut contents, "mission", application.mission.clone());
    put_optional(
        &mut contents,
        "previous_grants",
        application.previous_grants.as_deref(),
    );
    put(&mut contents, "start_year", application.start_year.clone());
    put(
        &mut contents,
        "budget_last",
        application.budget_last.to_string(),
    );
    put(
        &mut contents,
        "budget_current",
        application.budget_current.to_string(),
    );
    put(
        &mut contents,
        "grant_request",
        application.grant_request.clone(),
    );
    put(
        &mut contents,
        "contact_person",
        application.contact_person.clone(),
    );
    put(
        &mut contents,
        "contact_person_title",
        application.contact_person_title.clone(),
    );
    put_optional(
        &mut contents,
        "grant_period",
        application.grant_period.as_deref(),
    );
    put(
        &mut contents,
        "amount_requested",
        application.amount_requested.to_string(),
    );
    put(
        &mut contents,
        "support_type",
        application
            .support_type
            .map_or("", |support| support.as_str())
            .to_owned(),
    );
    put_optional(
        &mut contents,
        "project_title",
        application.project_title.as_deref(),
    );
    put(
        &mut contents,
        "project_budget",
        application
            .project_budget
            .map(|budget| budget.to_string())
            .unwrap_or_default(),
    );
    put_optional(&mut contents, "fiscal_org", application.fiscal_org.as_deref());
    put_optional(
        &mut contents,
        "fiscal_person",
        application.fiscal_person.as_deref(),
    );
    put_optional(
        &mut contents,
        "fiscal_telephone",
        application.fiscal_telephone.as_deref(),
    );
    put_optional(
        &mut contents,
        "fiscal_email",
        application.fiscal_email.as_deref(),
    );
    put_optional(
        &mut contents,
        "fiscal_address",
        application.fiscal_address.as_deref(),
    );
    put_optional(
        &mut contents,
        "fiscal_city",
        application.fiscal_city.as_deref(),
    );
    put_optional(
        &mut contents,
        "fiscal_state",
        application.fiscal_state.as_deref(),
    );
    put_optional(&mut contents, "fiscal_zip", application.fiscal_zip.as_deref());

    for answer in answers {
        let assembled = detail
            .questions
            .iter()
            .find(|question| question.cycle_question_id == answer.cycle_question_id)
            .ok_or_else(|| {
                Error::internal("Stored answer references a question the cycle does not carry")
            })?;
        expand_answer(&mut contents, &assembled.question.name, &answer.text)?;
    }

    Ok(ApplicationDraft::builder(application.organization_id, application.cycle_id)
        .created(now)
        .contents(contents)
        .files(application.files.clone())
        .build())
}

/// Serialises a composite field out of flat draft keys, or `None` for plain
/// fields.
#[must_use]
pub fn composite_to_json(contents: &BTreeMap<String, String>, name: &str) -> Option<String> {
    if name == "timeline" {
        Some(Timeline::from_flat(contents, name).to_json())
    } else if name.ends_with("_references") {
        Some(ReferenceList::from_flat(contents, name).to_json())
    } else {
        None
    }
}

fn expand_answer(
    contents: &mut BTreeMap<String, String>,
    name: &str,
    answer: &str,
) -> Result<(), Error> {
    if name == "timeline" {
        let timeline = Timeline::from_json(answer).map_err(|source| corrupt_answer(name, &source))?;
        contents.extend(timeline.to_flat(name));
    } else if name.ends_with("_references") {
        let references =
            ReferenceList::from_json(answer).map_err(|source| corrupt_answer(name, &source))?;
        contents.extend(references.to_flat(name));
    } else {
        contents.insert(name.to_owned(), answer.to_owned());
    }
    Ok(())
}

fn corrupt_answer(name: &str, source: &formenc::DecodeError) -> Error {
    Error::internal(format!("Stored answer for {name} failed to decode: {source}"))
}

fn put(contents: &mut BTreeMap<String, String>, name: &str, value: impl Into<String>) {
    contents.insert(name.to_owned(), value.into());
}

fn put_optional(contents: &mut BTreeMap<String, String>, name: &str, value: Option<&str>) {
    contents.insert(name.to_owned(), value.unwrap_or_default().to_owned());
}

fn text(contents: &BTreeMap<String, String>, field: &str) -> String {
    contents.get(field).cloned().unwrap_or_default()
}

fn optional(contents: &BTreeMap<String, String>, field: &str) -> Option<String> {
    contents
        .get(field)
        .filter(|value| !value.trim().is_empty())
        .cloned()
}

fn number(contents: &BTreeMap<String, String>, field: &str) -> Result<u32, Error> {
    text(contents, field)
        .trim()
        .parse()
        .map_err(|_| extraction_failure(field))
}

fn optional_number(contents: &BTreeMap<String, String>, field: &str) -> Result<Option<u32>, Error> {
    optional(contents, field)
        .map(|value| value.trim().parse().map_err(|_| extraction_failure(field)))
        .transpose()
}

fn support_type(contents: &BTreeMap<String, String>) -> Result<Option<SupportType>, Error> {
    optional(contents, "support_type")
        .map(|value| value.parse().map_err(|_| extraction_failure("support_type")))
        .transpose()
}

fn extraction_failure(field: &str) -> Error {
    Error::internal(format!("Field {field} failed typed extraction after validation"))
}
