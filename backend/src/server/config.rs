//! HTTP server configuration: environment-driven settings and the
//! assembled runtime configuration object.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use backend::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Settings loaded from the environment, CLI, and configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GRANTS")]
pub struct ServerSettings {
    /// Socket address to bind; see [`Self::bind_addr`].
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL. Fixture-backed services are used when
    /// absent, which only makes sense for local experiments.
    pub database_url: Option<String>,
    /// File the session cookie key is derived from.
    pub session_key_file: Option<PathBuf>,
    /// Whether session cookies require HTTPS; see [`Self::cookie_secure`].
    pub cookie_secure: Option<bool>,
    /// Directory uploaded files are stored under; see [`Self::blob_root`].
    pub blob_root: Option<PathBuf>,
    /// Shared secret the external scheduler presents on `POST /api/jobs/*`.
    pub scheduler_token: Option<String>,
}

impl ServerSettings {
    /// Socket address to bind, falling back to `0.0.0.0:8080`.
    #[must_use]
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or("0.0.0.0:8080")
    }

    /// Whether session cookies require HTTPS. On unless switched off for
    /// local development.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Directory uploaded files are stored under, falling back to
    /// `var/blobs`.
    #[must_use]
    pub fn blob_root(&self) -> PathBuf {
        self.blob_root
            .clone()
            .unwrap_or_else(|| PathBuf::from("var/blobs"))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) blob_root: PathBuf,
    pub(crate) scheduler_token: Option<String>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            blob_root: PathBuf::from("var/blobs"),
            scheduler_token: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed implementations for
    /// every repository port; otherwise fixtures serve empty data.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Set the directory uploaded files are stored under.
    #[must_use]
    pub fn with_blob_root(mut self, blob_root: PathBuf) -> Self {
        self.blob_root = blob_root;
        self
    }

    /// Set the shared scheduler token accepted on job triggers.
    #[must_use]
    pub fn with_scheduler_token(mut self, token: Option<String>) -> Self {
        self.scheduler_token = token;
        self
    }

    /// Return the socket address the server will bind to.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(
            dead_code,
            reason = "Exercised by integration tests; retained for fixture access"
        )
    )]
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }

    #[cfg(feature = "metrics")]
    /// Return the configured Prometheus middleware, if any.
    #[cfg_attr(
        not(any(test, doctest)),
        expect(
            dead_code,
            reason = "Exercised by integration tests behind feature flags"
        )
    )]
    #[must_use]
    pub fn metrics(&self) -> Option<&PrometheusMetrics> {
        self.prometheus.as_ref()
    }
}
