use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use activity_points::config::Config;
use activity_points::database;
use activity_points::services::auth_service;
use activity_points::web::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load().context("loading configuration")?;

    info!(database_url = %config.database_url, "connecting to database");
    let pool = database::connect(&config.database_url, config.database_max_connections)
        .await
        .context("connecting to database")?;
    database::migrate(&pool)
        .await
        .context("running migrations")?;

    if let Some(admin) = config.bootstrap_admin.as_ref() {
        if auth_service::bootstrap_admin(&pool, admin)
            .await
            .context("creating bootstrap admin")?
        {
            info!(email = %admin.email, "bootstrap admin ready");
        }
    }

    let host = config.host.clone();
    let port = config.port;
    let app = build_router(AppState::new(pool, config));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            let fallback_port = port.checked_add(1).context("no fallback port above 65535")?;
            warn!(%addr, error = %e, fallback_port, "could not bind, trying fallback port");
            let fallback: SocketAddr = format!("{}:{}", host, fallback_port)
                .parse()
                .context("invalid fallback address")?;
            tokio::net::TcpListener::bind(fallback)
                .await
                .with_context(|| format!("binding fallback address {}", fallback))?
        }
    };

    let bound_addr = listener.local_addr()?;
    info!("server listening on http://{}", bound_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
