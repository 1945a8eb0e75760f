//! Builders assembling the HTTP state from configured adapters.
//!
//! With a database pool every repository port gets its Diesel adapter;
//! without one the fixture ports serve empty data, which keeps smoke tests
//! and local experiments free of infrastructure.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use backend::domain::ports::{
    BlobStore, FixtureApplicationRepository, FixtureAwardRepository, FixtureBlobStore,
    FixtureCycleRepository, FixtureDraftRepository, FixtureJobRunRepository,
    FixtureNotificationRepository, FixtureOrganizationRepository, FixtureQuestionRepository,
    FixtureReportRepository,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::blob::DirectoryBlobStore;
use backend::outbound::email::LogEmailSender;
use backend::outbound::persistence::{
    DieselApplicationRepository, DieselAwardRepository, DieselCycleRepository,
    DieselDraftRepository, DieselJobRunRepository, DieselNotificationRepository,
    DieselOrganizationRepository, DieselQuestionRepository, DieselReportRepository,
};

use super::ServerConfig;

fn build_blob_store(config: &ServerConfig) -> std::io::Result<Arc<dyn BlobStore>> {
    if config.db_pool.is_none() {
        return Ok(Arc::new(FixtureBlobStore));
    }
    let store = DirectoryBlobStore::open(&config.blob_root)
        .map_err(|e| std::io::Error::other(format!("blob store setup failed: {e}")))?;
    Ok(Arc::new(store))
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let blobs = build_blob_store(config)?;

    let ports = match &config.db_pool {
        Some(pool) => HttpStatePorts {
            drafts: Arc::new(DieselDraftRepository::new(pool.clone())),
            cycles: Arc::new(DieselCycleRepository::new(pool.clone())),
            questions: Arc::new(DieselQuestionRepository::new(pool.clone())),
            organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
            applications: Arc::new(DieselApplicationRepository::new(pool.clone())),
            awards: Arc::new(DieselAwardRepository::new(pool.clone())),
            reports: Arc::new(DieselReportRepository::new(pool.clone())),
            job_runs: Arc::new(DieselJobRunRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
            emails: Arc::new(LogEmailSender),
            blobs,
            clock: Arc::new(DefaultClock),
        },
        None => HttpStatePorts {
            drafts: Arc::new(FixtureDraftRepository),
            cycles: Arc::new(FixtureCycleRepository),
            questions: Arc::new(FixtureQuestionRepository),
            organizations: Arc::new(FixtureOrganizationRepository),
            applications: Arc::new(FixtureApplicationRepository),
            awards: Arc::new(FixtureAwardRepository),
            reports: Arc::new(FixtureReportRepository),
            job_runs: Arc::new(FixtureJobRunRepository),
            notifications: Arc::new(FixtureNotificationRepository),
            emails: Arc::new(LogEmailSender),
            blobs,
            clock: Arc::new(DefaultClock),
        },
    };

    Ok(web::Data::new(HttpState::new(
        ports,
        config.scheduler_token.clone(),
    )))
}
