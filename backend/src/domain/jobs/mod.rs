//! Scheduled jobs, triggered daily over HTTP by an external scheduler.
//!
//! Each job guards itself with the run ledger: the first invocation of
//! the calendar day does the work and records a [`JobRun`]; any further
//! invocation that day reports the recorded outcome and does nothing.
//! Notification sends are additionally deduplicated through the
//! notification ledger, so a job that fails partway can be re-run the
//! next day without repeating successful sends.

mod auto_cycles;
mod draft_warnings;
mod ledger;
mod report_reminders;

pub use auto_cycles::{AutoCycleJob, LOOKBACK_HOURS, SUCCESSOR_WINDOW_DAYS};
pub use draft_warnings::DraftWarningJob;
pub use ledger::{JobKind, JobRun, NotificationKind, NotificationRecord, ParseJobKindError};
pub use report_reminders::{ReportReminderJob, MONTH_MARK_DAYS, WEEK_MARK_DAYS};

use crate::domain::ports::{JobRunRepositoryError, NotificationRepositoryError};
use crate::domain::Error;

/// The result of one job invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Which job ran.
    pub kind: JobKind,
    /// True when the day's run had already happened and nothing was done.
    pub skipped: bool,
    /// Short outcome summary, e.g. `"notified 3 of 5"`.
    pub outcome: String,
}

pub(crate) fn map_run_ledger_error(error: JobRunRepositoryError) -> Error {
    match error {
        JobRunRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("job run ledger unavailable: {message}"))
        }
        JobRunRepositoryError::Query { message } => {
            Error::internal(format!("job run ledger error: {message}"))
        }
    }
}

pub(crate) fn map_notification_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification ledger unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification ledger error: {message}"))
        }
    }
}
