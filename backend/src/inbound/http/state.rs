//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data`. The state
//! holds the domain services, assembled once from a bundle of driven
//! ports, so handlers stay thin and testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::jobs::{AutoCycleJob, DraftWarningJob, ReportReminderJob};
use crate::domain::ports::{
    ApplicationRepository, AwardRepository, BlobStore, CycleRepository, DraftRepository,
    EmailSender, JobRunRepository, NotificationRepository, OrganizationRepository,
    QuestionRepository, ReportRepository,
};
use crate::domain::{
    AwardService, CycleService, DraftService, ReportService, RolloverService, SubmissionService,
};

/// Parameter object bundling every driven port the HTTP layer needs.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub drafts: Arc<dyn DraftRepository>,
    pub cycles: Arc<dyn CycleRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
    pub awards: Arc<dyn AwardRepository>,
    pub reports: Arc<dyn ReportRepository>,
    pub job_runs: Arc<dyn JobRunRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub emails: Arc<dyn EmailSender>,
    pub blobs: Arc<dyn BlobStore>,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub cycles: CycleService,
    pub drafts: DraftService,
    pub submissions: SubmissionService,
    pub rollovers: RolloverService,
    pub awards: AwardService,
    pub reports: ReportService,
    pub auto_cycles: AutoCycleJob,
    pub draft_warnings: DraftWarningJob,
    pub report_reminders: ReportReminderJob,
    pub organizations: Arc<dyn OrganizationRepository>,
    /// Shared secret the external scheduler presents to trigger jobs.
    pub scheduler_token: Option<String>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, None)
    }
}

impl HttpState {
    /// Assemble the domain services from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use backend::domain::ports::{
    ///     FixtureApplicationRepository, FixtureAwardRepository, FixtureBlobStore,
    ///     FixtureCycleRepository, FixtureDraftRepository, FixtureEmailSender,
    ///     FixtureJobRunRepository, FixtureNotificationRepository,
    ///     FixtureOrganizationRepository, FixtureQuestionRepository, FixtureReportRepository,
    /// };
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use mockable::DefaultClock;
    ///
    /// let ports = HttpStatePorts {
    ///     drafts: Arc::new(FixtureDraftRepository),
    ///     cycles: Arc::new(FixtureCycleRepository),
    ///     questions: Arc::new(FixtureQuestionRepository),
    ///     organizations: Arc::new(FixtureOrganizationRepository),
    ///     applications: Arc::new(FixtureApplicationRepository),
    ///     awards: Arc::new(FixtureAwardRepository),
    ///     reports: Arc::new(FixtureReportRepository),
    ///     job_runs: Arc::new(FixtureJobRunRepository),
    ///     notifications: Arc::new(FixtureNotificationRepository),
    ///     emails: Arc::new(FixtureEmailSender),
    ///     blobs: Arc::new(FixtureBlobStore),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::new(ports, Some("scheduler-secret".to_owned()));
    /// let _cycles = state.cycles.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, scheduler_token: Option<String>) -> Self {
        let HttpStatePorts {
            drafts,
            cycles,
            questions,
            organizations,
            applications,
            awards,
            reports,
            job_runs,
            notifications,
            emails,
            blobs,
            clock,
        } = ports;
        Self {
            cycles: CycleService::new(cycles.clone(), questions, clock.clone()),
            drafts: DraftService::new(
                drafts.clone(),
                cycles.clone(),
                organizations.clone(),
                blobs.clone(),
                clock.clone(),
            ),
            submissions: SubmissionService::new(
                drafts.clone(),
                cycles.clone(),
                applications.clone(),
                clock.clone(),
            ),
            rollovers: RolloverService::new(
                drafts.clone(),
                cycles.clone(),
                applications.clone(),
                clock.clone(),
            ),
            awards: AwardService::new(
                awards.clone(),
                applications.clone(),
                reports.clone(),
                clock.clone(),
            ),
            reports: ReportService::new(
                awards.clone(),
                applications.clone(),
                cycles.clone(),
                reports.clone(),
                blobs,
                clock.clone(),
            ),
            auto_cycles: AutoCycleJob::new(
                cycles.clone(),
                drafts.clone(),
                job_runs.clone(),
                clock.clone(),
            ),
            draft_warnings: DraftWarningJob::new(
                cycles,
                drafts,
                organizations.clone(),
                notifications.clone(),
                emails.clone(),
                job_runs.clone(),
                clock.clone(),
            ),
            report_reminders: ReportReminderJob::new(
                awards,
                applications,
                organizations.clone(),
                reports,
                notifications,
                emails,
                job_runs,
                clock,
            ),
            organizations,
            scheduler_token,
        }
    }
}
