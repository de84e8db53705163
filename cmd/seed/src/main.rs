//! Provisions one admin account per department in the configured
//! PostgreSQL database. Existing accounts are left untouched.

use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth_adapters::Argon2Hasher;
use configs::Settings;
use services::bootstrap::seed_department_admins;
use storage_adapters::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let url = settings
        .database
        .url()
        .context("CIVIC__DATABASE__URL must be set to seed")?;
    let password = settings
        .auth
        .seed_admin_password
        .as_ref()
        .context("CIVIC__AUTH__SEED_ADMIN_PASSWORD must be set to seed")?;

    let store = PgStore::connect(url, settings.database.max_connections)
        .await
        .context("failed to connect to postgres")?;
    let created = seed_department_admins(&store, &Argon2Hasher::new(), password.expose_secret())
        .await
        .context("failed to provision department admins")?;

    info!(created, "seed complete");
    Ok(())
}
