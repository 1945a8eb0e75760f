//! Daily reminder emails for upcoming grantee report due dates.
//!
//! An award gets at most two reminders per report: one a month out and
//! one a week out, matched by exact date against the report's due date.
//! Each mark is also checked a year back, so a due date anchored when
//! the award was created still lines up after the first grant year.
//! Duplicate sends are suppressed by the notification ledger.

use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};
use mockable::Clock;
use tracing::warn;

use crate::domain::award::Award;
use crate::domain::award_service::AwardService;
use crate::domain::draft_service::DraftService;
use crate::domain::ports::{
    ApplicationRepository, AwardRepository, EmailMessage, EmailSender, JobRunRepository,
    NotificationRepository, OrganizationRepository, ReportRepository,
};
use crate::domain::submission_service::SubmissionService;
use crate::domain::Error;

use super::{
    map_notification_error, map_run_ledger_error, JobKind, JobReport, JobRun, NotificationKind,
    NotificationRecord,
};

/// Days before the due date the first reminder fires.
pub const MONTH_MARK_DAYS: u64 = 30;

/// Days before the due date the second reminder fires.
pub const WEEK_MARK_DAYS: u64 = 7;

/// Reminds grantees of upcoming report due dates.
#[derive(Clone)]
pub struct ReportReminderJob {
    awards: Arc<dyn AwardRepository>,
    applications: Arc<dyn ApplicationRepository>,
    organizations: Arc<dyn OrganizationRepository>,
    reports: Arc<dyn ReportRepository>,
    notifications: Arc<dyn NotificationRepository>,
    emails: Arc<dyn EmailSender>,
    runs: Arc<dyn JobRunRepository>,
    clock: Arc<dyn Clock>,
}

/// The four dates a reminder can match on a given day: the month and
/// week marks, each in the current and the prior year.
fn reminder_dates(today: NaiveDate) -> Vec<(NaiveDate, NotificationKind)> {
    let mut dates = Vec::with_capacity(4);
    let marks = [
        (MONTH_MARK_DAYS, NotificationKind::ReportReminderMonth),
        (WEEK_MARK_DAYS, NotificationKind::ReportReminderWeek),
    ];
    for (days, kind) in marks {
        if let Some(mark) = today.checked_add_days(Days::new(days)) {
            dates.push((mark, kind));
            if let Some(prior_year) = mark.checked_sub_months(Months::new(12)) {
                dates.push((prior_year, kind));
            }
        }
    }
    dates
}

impl ReportReminderJob {
    /// Create a new job over the given ports.
    #[expect(
        clippy::too_many_arguments,
        reason = "one argument per port, matching the other jobs"
    )]
    pub fn new(
        awards: Arc<dyn AwardRepository>,
        applications: Arc<dyn ApplicationRepository>,
        organizations: Arc<dyn OrganizationRepository>,
        reports: Arc<dyn ReportRepository>,
        notifications: Arc<dyn NotificationRepository>,
        emails: Arc<dyn EmailSender>,
        runs: Arc<dyn JobRunRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            awards,
            applications,
            organizations,
            reports,
            notifications,
            emails,
            runs,
            clock,
        }
    }

    /// Run the job once; a second run on the same day is a no-op.
    pub async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        let today = now.date_naive();
        if let Some(prior) = self
            .runs
            .find_run(JobKind::ReportReminders, today)
            .await
            .map_err(map_run_ledger_error)?
        {
            return Ok(JobReport {
                kind: JobKind::ReportReminders,
                skipped: true,
                outcome: prior.outcome,
            });
        }

        let targets = reminder_dates(today);
        let dates: Vec<NaiveDate> = targets.iter().map(|(date, _)| *date).collect();
        let awards = self
            .awards
            .list_with_report_due_on(&dates)
            .await
            .map_err(AwardService::map_award_error)?;

        let mut notified = 0_usize;
        for award in &awards {
            if self.remind_grantee(award, &targets).await? {
                notified += 1;
            }
        }

        let outcome = format!("notified {notified} of {}", awards.len());
        let run = JobRun::started(JobKind::ReportReminders, now, outcome.clone());
        self.runs.record(&run).await.map_err(map_run_ledger_error)?;
        Ok(JobReport {
            kind: JobKind::ReportReminders,
            skipped: false,
            outcome,
        })
    }

    /// Send one reminder; returns whether a new notification went out.
    async fn remind_grantee(
        &self,
        award: &Award,
        targets: &[(NaiveDate, NotificationKind)],
    ) -> Result<bool, Error> {
        let reports_submitted = self
            .reports
            .count_submitted(award.id)
            .await
            .map_err(AwardService::map_report_error)?;
        let Some(due_date) = award.next_report_due(reports_submitted) else {
            return Ok(false);
        };
        let Some(kind) = targets
            .iter()
            .find(|(date, _)| *date == due_date)
            .map(|(_, kind)| *kind)
        else {
            return Ok(false);
        };

        let Some(application) = self
            .applications
            .find(award.application_id)
            .await
            .map_err(SubmissionService::map_application_error)?
        else {
            warn!(award_id = %award.id, "award references a missing application");
            return Ok(false);
        };
        let Some(organization) = self
            .organizations
            .find(application.organization_id)
            .await
            .map_err(DraftService::map_organization_error)?
        else {
            warn!(award_id = %award.id, "award belongs to a missing organization");
            return Ok(false);
        };
        let Some(recipient) = organization.contact_email() else {
            warn!(
                organization_id = %organization.id,
                "organization has no contact address for a report reminder"
            );
            return Ok(false);
        };

        if self
            .notifications
            .was_sent(recipient, kind, due_date)
            .await
            .map_err(map_notification_error)?
        {
            return Ok(false);
        }

        let report_number = award
            .next_report_number(reports_submitted)
            .unwrap_or(1)
            .to_string();
        let message = EmailMessage::to(recipient, "Your grant report is due soon", "report_reminder")
            .with("organization", organization.name.clone())
            .with("due_date", due_date.to_string())
            .with("report_number", report_number);
        if let Err(error) = self.emails.send(&message).await {
            warn!(%recipient, %error, "report reminder send failed");
            return Ok(false);
        }

        let record = NotificationRecord::sent(recipient, kind, due_date, self.clock.utc());
        self.notifications
            .record(&record)
            .await
            .map_err(map_notification_error)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        MockApplicationRepository, MockAwardRepository, MockEmailSender, MockJobRunRepository,
        MockNotificationRepository, MockOrganizationRepository, MockReportRepository,
    };
    use crate::test_support::clock::MutableClock;
    use crate::test_support::fixtures::{sample_application, sample_organization};
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;

    struct Harness {
        awards: MockAwardRepository,
        applications: MockApplicationRepository,
        organizations: MockOrganizationRepository,
        reports: MockReportRepository,
        notifications: MockNotificationRepository,
        emails: MockEmailSender,
        runs: MockJobRunRepository,
        clock: Arc<MutableClock>,
    }

    impl Harness {
        fn new(now: DateTime<Utc>) -> Self {
            Self {
                awards: MockAwardRepository::new(),
                applications: MockApplicationRepository::new(),
                organizations: MockOrganizationRepository::new(),
                reports: MockReportRepository::new(),
                notifications: MockNotificationRepository::new(),
                emails: MockEmailSender::new(),
                runs: MockJobRunRepository::new(),
                clock: Arc::new(MutableClock::new(now)),
            }
        }

        fn fresh_day(mut self) -> Self {
            self.runs.expect_find_run().return_once(|_, _| Ok(None));
            self
        }

        fn job(self) -> ReportReminderJob {
            ReportReminderJob::new(
                Arc::new(self.awards),
                Arc::new(self.applications),
                Arc::new(self.organizations),
                Arc::new(self.reports),
                Arc::new(self.notifications),
                Arc::new(self.emails),
                Arc::new(self.runs),
                self.clock,
            )
        }
    }

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0)
            .single()
            .expect("valid time")
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[rstest]
    fn reminder_dates_cover_both_marks_in_two_years() {
        let dates = reminder_dates(date(2024, 2, 1));
        assert_eq!(
            dates,
            vec![
                (date(2024, 3, 2), NotificationKind::ReportReminderMonth),
                (date(2023, 3, 2), NotificationKind::ReportReminderMonth),
                (date(2024, 2, 8), NotificationKind::ReportReminderWeek),
                (date(2023, 2, 8), NotificationKind::ReportReminderWeek),
            ],
        );
    }

    #[rstest]
    #[tokio::test]
    async fn sends_the_month_mark_reminder() {
        let now = noon(2024, 1, 31);
        let application = sample_application();
        let mut organization = sample_organization();
        organization.id = application.organization_id;
        let award = Award::builder(application.id, 15_000, date(2024, 3, 1)).build();

        let mut harness = Harness::new(now).fresh_day();
        let listed = award.clone();
        harness
            .awards
            .expect_list_with_report_due_on()
            .withf(|dates| dates.contains(&date(2024, 3, 1)))
            .return_once(move |_| Ok(vec![listed]));
        harness.reports.expect_count_submitted().return_once(|_| Ok(0));
        harness
            .applications
            .expect_find()
            .return_once(move |_| Ok(Some(application)));
        harness
            .organizations
            .expect_find()
            .return_once(move |_| Ok(Some(organization)));
        harness
            .notifications
            .expect_was_sent()
            .withf(|recipient, kind, due_date| {
                recipient == "org@example.org"
                    && *kind == NotificationKind::ReportReminderMonth
                    && *due_date == date(2024, 3, 1)
            })
            .return_once(|_, _, _| Ok(false));
        harness
            .emails
            .expect_send()
            .withf(|message| {
                message.template == "report_reminder"
                    && message.context.get("due_date").map(String::as_str) == Some("2024-03-01")
            })
            .times(1)
            .return_once(|_| Ok(()));
        harness
            .notifications
            .expect_record()
            .withf(|record| record.kind == NotificationKind::ReportReminderMonth)
            .times(1)
            .return_once(|_| Ok(()));
        harness
            .runs
            .expect_record()
            .withf(|run| run.outcome == "notified 1 of 1")
            .times(1)
            .return_once(|_| Ok(()));

        let report = harness.job().run().await.expect("report");
        assert_eq!(report.outcome, "notified 1 of 1");
    }

    #[rstest]
    #[tokio::test]
    async fn a_prior_year_due_date_matches_the_week_mark() {
        let now = noon(2025, 2, 22);
        let application = sample_application();
        let mut organization = sample_organization();
        organization.id = application.organization_id;
        let award = Award::builder(application.id, 15_000, date(2024, 3, 1)).build();

        let mut harness = Harness::new(now).fresh_day();
        let listed = award.clone();
        harness
            .awards
            .expect_list_with_report_due_on()
            .return_once(move |_| Ok(vec![listed]));
        harness.reports.expect_count_submitted().return_once(|_| Ok(0));
        harness
            .applications
            .expect_find()
            .return_once(move |_| Ok(Some(application)));
        harness
            .organizations
            .expect_find()
            .return_once(move |_| Ok(Some(organization)));
        harness
            .notifications
            .expect_was_sent()
            .return_once(|_, _, _| Ok(false));
        harness
            .emails
            .expect_send()
            .withf(|message| {
                message.context.get("due_date").map(String::as_str) == Some("2024-03-01")
            })
            .times(1)
            .return_once(|_| Ok(()));
        harness
            .notifications
            .expect_record()
            .withf(|record| record.kind == NotificationKind::ReportReminderWeek)
            .times(1)
            .return_once(|_| Ok(()));
        harness.runs.expect_record().times(1).return_once(|_| Ok(()));

        let report = harness.job().run().await.expect("report");
        assert_eq!(report.outcome, "notified 1 of 1");
    }

    #[rstest]
    #[tokio::test]
    async fn no_reminder_once_every_report_is_in() {
        let now = noon(2024, 1, 31);
        let award = Award::builder(sample_application().id, 15_000, date(2024, 3, 1)).build();

        let mut harness = Harness::new(now).fresh_day();
        harness
            .awards
            .expect_list_with_report_due_on()
            .return_once(move |_| Ok(vec![award]));
        harness.reports.expect_count_submitted().return_once(|_| Ok(1));
        harness.emails.expect_send().times(0);
        harness
            .runs
            .expect_record()
            .withf(|run| run.outcome == "notified 0 of 1")
            .times(1)
            .return_once(|_| Ok(()));

        let report = harness.job().run().await.expect("report");
        assert_eq!(report.outcome, "notified 0 of 1");
    }

    #[rstest]
    #[tokio::test]
    async fn the_ledger_suppresses_a_repeat_send() {
        let now = noon(2024, 1, 31);
        let application = sample_application();
        let mut organization = sample_organization();
        organization.id = application.organization_id;
        let award = Award::builder(application.id, 15_000, date(2024, 3, 1)).build();

        let mut harness = Harness::new(now).fresh_day();
        harness
            .awards
            .expect_list_with_report_due_on()
            .return_once(move |_| Ok(vec![award]));
        harness.reports.expect_count_submitted().return_once(|_| Ok(0));
        harness
            .applications
            .expect_find()
            .return_once(move |_| Ok(Some(application)));
        harness
            .organizations
            .expect_find()
            .return_once(move |_| Ok(Some(organization)));
        harness
            .notifications
            .expect_was_sent()
            .return_once(|_, _, _| Ok(true));
        harness.emails.expect_send().times(0);
        harness
            .runs
            .expect_record()
            .withf(|run| run.outcome == "notified 0 of 1")
            .times(1)
            .return_once(|_| Ok(()));

        let report = harness.job().run().await.expect("report");
        assert_eq!(report.outcome, "notified 0 of 1");
    }
}
