//! # civic-desk
//!
//! Server entry point. Picks the storage backend from configuration,
//! wires the services and serves the axum router until Ctrl-C.

use std::sync::Arc;

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api_adapters::{router, AppState};
use auth_adapters::{Argon2Hasher, JwtTokenService};
use configs::{LogSettings, Settings};
use domains::{AdminRepository, ComplaintRepository, PasswordHasher, TokenService, UserRepository};
use services::bootstrap::seed_department_admins;
use services::{AuthService, ComplaintService, DirectoryService};
use storage_adapters::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings.log);

    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(
        settings.auth.jwt_secret.expose_secret().as_bytes(),
        chrono::Duration::minutes(settings.auth.token_ttl_minutes),
    ));

    let state = match settings.database.url() {
        Some(url) => postgres_state(url, &settings, hasher, tokens).await?,
        None => {
            let store = Arc::new(InMemoryStore::new());
            match &settings.auth.seed_admin_password {
                Some(password) => {
                    let password = password.expose_secret();
                    seed_department_admins(store.as_ref(), hasher.as_ref(), password)
                        .await
                        .context("failed to provision department admins")?;
                }
                None => warn!("no seed admin password configured; admin login is unavailable"),
            }
            warn!("no database configured; complaints are kept in memory only");
            assemble(store, hasher, tokens, "memory")
        }
    };

    let addr = settings.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, storage = state.storage, "civic-desk listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("civic-desk stopped");
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn postgres_state(
    url: &str,
    settings: &Settings,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
) -> Result<AppState> {
    let store = storage_adapters::PgStore::connect(url, settings.database.max_connections)
        .await
        .context("failed to connect to postgres")?;
    Ok(assemble(Arc::new(store), hasher, tokens, "postgres"))
}

#[cfg(not(feature = "db-postgres"))]
async fn postgres_state(
    _url: &str,
    _settings: &Settings,
    _hasher: Arc<dyn PasswordHasher>,
    _tokens: Arc<dyn TokenService>,
) -> Result<AppState> {
    anyhow::bail!("a database url is configured but this build lacks the db-postgres feature")
}

fn assemble<S>(
    store: Arc<S>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    storage: &'static str,
) -> AppState
where
    S: ComplaintRepository + UserRepository + AdminRepository + 'static,
{
    AppState::new(
        ComplaintService::new(store.clone(), store.clone(), store.clone()),
        AuthService::new(store.clone(), store.clone(), hasher, tokens),
        DirectoryService::new(store),
        storage,
    )
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
