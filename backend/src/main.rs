//! Backend entry-point: wires REST endpoints and OpenAPI docs.

mod server;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use std::env;
use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroize;

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::{ServerConfig, ServerSettings, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|e| std::io::Error::other(format!("configuration error: {e}")))?;

    let bind_addr: SocketAddr = settings
        .bind_addr()
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;

    let key = load_session_key(&settings)?;

    let db_pool = match &settings.database_url {
        Some(url) => {
            run_pending_migrations(url)?;
            let pool = DbPool::new(PoolConfig::new(url.clone()))
                .await
                .map_err(|e| std::io::Error::other(format!("pool setup failed: {e}")))?;
            Some(pool)
        }
        None => {
            warn!("no database configured; serving fixture data");
            None
        }
    };

    let mut config = ServerConfig::new(key, settings.cookie_secure(), SameSite::Lax, bind_addr)
        .with_blob_root(settings.blob_root())
        .with_scheduler_token(settings.scheduler_token.clone());
    if let Some(pool) = db_pool {
        config = config.with_db_pool(pool);
    }
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(make_metrics()));

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(addr = %bind_addr, "server starting");
    server.await
}

/// Derive the session cookie key from the configured file, falling back to
/// an ephemeral key only in debug builds or when explicitly allowed.
fn load_session_key(settings: &ServerSettings) -> std::io::Result<Key> {
    let key_path = settings
        .session_key_file
        .clone()
        .unwrap_or_else(|| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(mut bytes) => {
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    key_path.display()
                )))
            }
        }
    }
}

/// Apply embedded migrations over a short-lived synchronous connection.
fn run_pending_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migration failed: {e}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied database migrations");
    }
    Ok(())
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    PrometheusMetricsBuilder::new("grants")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
