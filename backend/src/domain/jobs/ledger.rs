//! Durable ledgers that make the scheduled jobs idempotent.
//!
//! The run ledger records one row per `(job, calendar day)`, so an
//! external scheduler can re-invoke a job endpoint freely: the second
//! invocation of the day is a no-op. The notification ledger records one
//! row per `(recipient, kind, due date)` and only after a successful
//! send, giving reminder emails at-least-once delivery without
//! duplicates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The scheduled jobs this service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Clone recently closed rapid/seed cycles into a fresh window.
    AutoCycles,
    /// Warn organizations whose drafts are about to expire.
    DraftWarnings,
    /// Remind grantees of upcoming report due dates.
    ReportReminders,
}

impl JobKind {
    /// Every job, in trigger-endpoint order.
    pub const ALL: [Self; 3] = [Self::AutoCycles, Self::DraftWarnings, Self::ReportReminders];

    /// Returns the endpoint path segment.
    ///
    /// # Examples
    ///
    /// ```
    /// # use backend::domain::jobs::JobKind;
    /// assert_eq!(JobKind::DraftWarnings.as_str(), "draft-warnings");
    /// ```
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoCycles => "auto-cycles",
            Self::DraftWarnings => "draft-warnings",
            Self::ReportReminders => "report-reminders",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown job kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJobKindError {
    /// The unrecognised input value.
    pub input: String,
}

impl std::fmt::Display for ParseJobKindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown job kind: {}", self.input)
    }
}

impl std::error::Error for ParseJobKindError {}

impl std::str::FromStr for JobKind {
    type Err = ParseJobKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseJobKindError {
                input: s.to_owned(),
            })
    }
}

/// One completed job invocation; unique per `(kind, run_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct JobRun {
    /// Run row id.
    pub id: Uuid,
    /// The job that ran.
    pub kind: JobKind,
    /// Calendar day of the run; a second run on this day is a no-op.
    pub run_date: NaiveDate,
    /// Moment the run started.
    pub started_at: DateTime<Utc>,
    /// Short outcome summary, e.g. `"notified 3 of 5"`.
    pub outcome: String,
}

impl JobRun {
    /// A run record starting now.
    #[must_use]
    pub fn started(kind: JobKind, now: DateTime<Utc>, outcome: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            run_date: now.date_naive(),
            started_at: now,
            outcome: outcome.into(),
        }
    }
}

/// The notification emails the jobs send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Draft nearing the cycle close.
    DraftWarning,
    /// Report due in thirty days.
    ReportReminderMonth,
    /// Report due in one week.
    ReportReminderWeek,
}

impl NotificationKind {
    /// Returns the ledger string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DraftWarning => "draft_warning",
            Self::ReportReminderMonth => "report_reminder_month",
            Self::ReportReminderWeek => "report_reminder_week",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One successfully sent notification; unique per
/// `(recipient, kind, due_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct NotificationRecord {
    /// Record row id.
    pub id: Uuid,
    /// Email address the notification went to.
    pub recipient: String,
    /// Which notification was sent.
    pub kind: NotificationKind,
    /// The deadline the notification was about.
    pub due_date: NaiveDate,
    /// Moment the send succeeded.
    pub sent_at: DateTime<Utc>,
}

impl NotificationRecord {
    /// A record for a send that just succeeded.
    #[must_use]
    pub fn sent(
        recipient: impl Into<String>,
        kind: NotificationKind,
        due_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            kind,
            due_date,
            sent_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn job_kinds_round_trip_through_path_segments() {
        for kind in JobKind::ALL {
            let parsed: JobKind = kind.as_str().parse().expect("round-trip");
            assert_eq!(parsed, kind);
        }
    }

    #[rstest]
    #[case::unknown("weekly-digest")]
    #[case::snake_case("auto_cycles")]
    fn job_kind_rejects_unknown_segments(#[case] input: &str) {
        let result: Result<JobKind, _> = input.parse();
        assert!(result.is_err());
    }

    #[rstest]
    fn run_records_carry_the_calendar_day() {
        let now = Utc::now();
        let run = JobRun::started(JobKind::AutoCycles, now, "created 1 cycle");
        assert_eq!(run.run_date, now.date_naive());
        assert_eq!(run.outcome, "created 1 cycle");
    }

    #[rstest]
    fn notification_records_key_on_due_date() {
        let now = Utc::now();
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date");
        let record =
            NotificationRecord::sent("org@example.org", NotificationKind::ReportReminderWeek, due, now);
        assert_eq!(record.recipient, "org@example.org");
        assert_eq!(record.due_date, due);
        assert_eq!(record.sent_at, now);
    }
}
