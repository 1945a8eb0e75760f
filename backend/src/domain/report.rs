//! Grantee reports: the award-side mirror of drafts and submissions.
//!
//! Each award owes one report per grant year. A report draft collects
//! answers keyed by report-question name, autosaves under the same
//! staleness protocol as application drafts, and submission converts it
//! into a `GranteeReport` plus one answer per cycle report question.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::award::Award;
use super::draft::staleness_window;

/// A submitted grantee report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct GranteeReport {
    /// Report row id.
    pub id: Uuid,
    /// Award the report covers.
    pub award_id: Uuid,
    /// 1 or 2; unique together with the award.
    pub report_number: u32,
    /// Moment of submission.
    pub submitted: DateTime<Utc>,
}

/// One answer on a submitted grantee report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ReportAnswer {
    /// Answer row id.
    pub id: Uuid,
    /// Owning report.
    pub grantee_report_id: Uuid,
    /// Cycle report question answered; unique together with the report.
    pub cycle_report_question_id: Uuid,
    /// Plain text, a number rendered as text, or a blob reference for
    /// file and photo questions.
    pub text: String,
}

/// A mutable, partially filled grantee report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct ReportDraft {
    /// Draft row id.
    pub id: Uuid,
    /// Award the report covers.
    pub award_id: Uuid,
    /// 1 or 2; unique together with the award.
    pub report_number: u32,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Time of the most recent autosave.
    pub modified: DateTime<Utc>,
    /// Identity that performed the most recent autosave.
    pub modified_by: Option<String>,
    /// Flat answers keyed by report-question name.
    pub contents: BTreeMap<String, String>,
    /// Blob references keyed by report-question name.
    pub files: BTreeMap<String, String>,
}

impl ReportDraft {
    /// A fresh, empty draft for the given report slot.
    #[must_use]
    pub fn new(award_id: Uuid, report_number: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            award_id,
            report_number,
            created: now,
            modified: now,
            modified_by: None,
            contents: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// The schedule date this draft is working towards.
    #[must_use]
    pub fn due_date(&self, award: &Award) -> Option<NaiveDate> {
        if self.report_number == 1 {
            Some(award.first_report_due)
        } else {
            award.second_report_due
        }
    }

    /// Whether an autosave landed within the staleness window before `now`.
    #[must_use]
    pub fn recently_edited(&self, now: DateTime<Utc>) -> bool {
        now < self.modified + staleness_window()
    }

    /// Whether a save by `editor` collides with a fresher save from someone
    /// else.
    #[must_use]
    pub fn conflicts_with(&self, editor: &str, now: DateTime<Utc>) -> bool {
        self.recently_edited(now)
            && self
                .modified_by
                .as_deref()
                .is_some_and(|last| last != editor)
    }

    /// Returns the stored value for a question, or empty when unset.
    #[must_use]
    pub fn field(&self, name: &str) -> &str {
        self.contents.get(name).map_or("", String::as_str)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[rstest]
    fn due_date_follows_the_report_number() {
        let award = Award::builder(Uuid::new_v4(), 12_000, date(2024, 3, 1))
            .second_year(8_000, date(2025, 3, 1))
            .build();
        let now = Utc::now();

        let first = ReportDraft::new(award.id, 1, now);
        assert_eq!(first.due_date(&award), Some(date(2024, 3, 1)));

        let second = ReportDraft::new(award.id, 2, now);
        assert_eq!(second.due_date(&award), Some(date(2025, 3, 1)));
    }

    #[rstest]
    fn second_report_has_no_due_date_on_a_one_year_grant() {
        let award = Award::builder(Uuid::new_v4(), 12_000, date(2024, 3, 1)).build();
        let draft = ReportDraft::new(award.id, 2, Utc::now());
        assert_eq!(draft.due_date(&award), None);
    }

    #[rstest]
    fn autosave_conflicts_mirror_application_drafts() {
        let now = Utc::now();
        let mut draft = ReportDraft::new(Uuid::new_v4(), 1, now - Duration::seconds(10));
        draft.modified_by = Some("bob".to_owned());

        assert!(draft.recently_edited(now));
        assert!(draft.conflicts_with("alice", now));
        assert!(!draft.conflicts_with("bob", now));

        draft.modified = now - Duration::seconds(60);
        assert!(!draft.conflicts_with("alice", now));
    }

    #[rstest]
    fn fields_default_to_empty() {
        let draft = ReportDraft::new(Uuid::new_v4(), 1, Utc::now());
        assert_eq!(draft.field("total_spent"), "");
    }
}
