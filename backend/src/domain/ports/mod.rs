//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the database, the mail backend, blob storage). Each trait exposes a
//! strongly typed error enum so adapters map their failures into
//! predictable variants, and each ships a fixture implementation for
//! tests that do not exercise that edge.

mod macros;
pub(crate) use macros::define_port_error;

mod application_repository;
mod award_repository;
mod blob_store;
mod cycle_repository;
mod draft_repository;
mod email_sender;
mod job_run_repository;
mod notification_repository;
mod organization_repository;
mod question_repository;
mod report_repository;

#[cfg(test)]
pub use application_repository::MockApplicationRepository;
pub use application_repository::{
    ApplicationRepository, ApplicationRepositoryError, FixtureApplicationRepository,
};
#[cfg(test)]
pub use award_repository::MockAwardRepository;
pub use award_repository::{AwardRepository, AwardRepositoryError, FixtureAwardRepository};
#[cfg(test)]
pub use blob_store::MockBlobStore;
pub use blob_store::{BlobStore, BlobStoreError, FixtureBlobStore};
#[cfg(test)]
pub use cycle_repository::MockCycleRepository;
pub use cycle_repository::{CycleRepository, CycleRepositoryError, FixtureCycleRepository};
#[cfg(test)]
pub use draft_repository::MockDraftRepository;
pub use draft_repository::{DraftRepository, DraftRepositoryError, FixtureDraftRepository};
#[cfg(test)]
pub use email_sender::MockEmailSender;
pub use email_sender::{EmailError, EmailMessage, EmailSender, FixtureEmailSender};
#[cfg(test)]
pub use job_run_repository::MockJobRunRepository;
pub use job_run_repository::{FixtureJobRunRepository, JobRunRepository, JobRunRepositoryError};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{
    FixtureNotificationRepository, NotificationRepository, NotificationRepositoryError,
};
#[cfg(test)]
pub use organization_repository::MockOrganizationRepository;
pub use organization_repository::{
    FixtureOrganizationRepository, OrganizationRepository, OrganizationRepositoryError,
};
#[cfg(test)]
pub use question_repository::MockQuestionRepository;
pub use question_repository::{
    FixtureQuestionRepository, QuestionRepository, QuestionRepositoryError,
};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{FixtureReportRepository, ReportRepository, ReportRepositoryError};
