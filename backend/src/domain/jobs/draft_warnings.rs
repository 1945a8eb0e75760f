//! Daily warning emails for drafts nearing the cycle close.
//!
//! Drafts started with plenty of runway get a warning a week before the
//! close; drafts started inside the final eight days get a short-notice
//! warning at the two-day mark instead. Both windows are measured
//! against the draft's effective close, so an extended deadline shifts
//! the warning with it. A failed send is not recorded in the ledger and
//! is retried by the next day's run.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use tracing::warn;

use crate::domain::cycle::GrantCycle;
use crate::domain::cycle_service::CycleService;
use crate::domain::draft::ApplicationDraft;
use crate::domain::draft_service::DraftService;
use crate::domain::ports::{
    CycleRepository, DraftRepository, EmailMessage, EmailSender, JobRunRepository,
    NotificationRepository, OrganizationRepository,
};
use crate::domain::Error;

use super::{
    map_notification_error, map_run_ledger_error, JobKind, JobReport, JobRun, NotificationKind,
    NotificationRecord,
};

/// Warns organizations whose drafts are about to expire.
#[derive(Clone)]
pub struct DraftWarningJob {
    cycles: Arc<dyn CycleRepository>,
    drafts: Arc<dyn DraftRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    notifications: Arc<dyn NotificationRepository>,
    emails: Arc<dyn EmailSender>,
    runs: Arc<dyn JobRunRepository>,
    clock: Arc<dyn Clock>,
}

/// Whether the draft falls inside its warning window at `now`.
///
/// Drafts created more than eight days before the effective close warn
/// between seven and eight days out; later drafts warn between two and
/// three days out.
fn warning_due(draft: &ApplicationDraft, cycle: &GrantCycle, now: DateTime<Utc>) -> bool {
    let close = draft.extended_deadline.unwrap_or(cycle.close_time);
    let time_left = close - now;
    if close - draft.created > Duration::days(8) {
        Duration::days(7) < time_left && time_left < Duration::days(8)
    } else {
        Duration::days(2) <= time_left && time_left < Duration::days(3)
    }
}

impl DraftWarningJob {
    /// Create a new job over the given ports.
    pub fn new(
        cycles: Arc<dyn CycleRepository>,
        drafts: Arc<dyn DraftRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        notifications: Arc<dyn NotificationRepository>,
        emails: Arc<dyn EmailSender>,
        runs: Arc<dyn JobRunRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cycles,
            drafts,
            organizations,
            notifications,
            emails,
            runs,
            clock,
        }
    }

    /// Run the job once; a second run on the same day is a no-op.
    pub async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        if let Some(prior) = self
            .runs
            .find_run(JobKind::DraftWarnings, now.date_naive())
            .await
            .map_err(map_run_ledger_error)?
        {
            return Ok(JobReport {
                kind: JobKind::DraftWarnings,
                skipped: true,
                outcome: prior.outcome,
            });
        }

        let open = self
            .cycles
            .list_open(now)
            .await
            .map_err(CycleService::map_cycle_error)?;

        let mut due = 0_usize;
        let mut notified = 0_usize;
        for cycle in &open {
            let drafts = self
                .drafts
                .list_for_cycle(cycle.id)
                .await
                .map_err(DraftService::map_draft_error)?;
            for draft in &drafts {
                if !warning_due(draft, cycle, now) {
                    continue;
                }
                due += 1;
                if self.warn_organization(draft, cycle, now).await? {
                    notified += 1;
                }
            }
        }

        let outcome = format!("notified {notified} of {due}");
        let run = JobRun::started(JobKind::DraftWarnings, now, outcome.clone());
        self.runs.record(&run).await.map_err(map_run_ledger_error)?;
        Ok(JobReport {
            kind: JobKind::DraftWarnings,
            skipped: false,
            outcome,
        })
    }

    /// Send one warning; returns whether a new notification went out.
    async fn warn_organization(
        &self,
        draft: &ApplicationDraft,
        cycle: &GrantCycle,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let Some(organization) = self
            .organizations
            .find(draft.organization_id)
            .await
            .map_err(DraftService::map_organization_error)?
        else {
            warn!(draft_id = %draft.id, "draft belongs to a missing organization");
            return Ok(false);
        };
        let Some(recipient) = organization.contact_email() else {
            warn!(
                organization_id = %organization.id,
                "organization has no contact address for a draft warning"
            );
            return Ok(false);
        };

        let close = draft.extended_deadline.unwrap_or(cycle.close_time);
        let due_date = close.date_naive();
        if self
            .notifications
            .was_sent(recipient, NotificationKind::DraftWarning, due_date)
            .await
            .map_err(map_notification_error)?
        {
            return Ok(false);
        }

        let message = EmailMessage::to(
            recipient,
            "Your grant application draft expires soon",
            "draft_warning",
        )
        .with("organization", organization.name.clone())
        .with("cycle_title", cycle.title.clone())
        .with("close", close.to_rfc3339());
        if let Err(error) = self.emails.send(&message).await {
            warn!(%recipient, %error, "draft warning send failed");
            return Ok(false);
        }

        let record =
            NotificationRecord::sent(recipient, NotificationKind::DraftWarning, due_date, now);
        self.notifications
            .record(&record)
            .await
            .map_err(map_notification_error)?;
        Ok(true)
    }
}
