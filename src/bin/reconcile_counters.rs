use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use activity_points::config::Config;
use activity_points::database;
use activity_points::services::reconcile_service;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::load().context("loading configuration")?;
    let pool = database::connect(&config.database_url, 1)
        .await
        .context("connecting to database")?;
    database::migrate(&pool)
        .await
        .context("running migrations")?;

    let report = reconcile_service::reconcile(&pool)
        .await
        .context("reconciling counters")?;
    println!(
        "reconcile: clubs_checked={}, clubs_fixed={}, students_checked={}, students_fixed={}",
        report.clubs_checked, report.clubs_fixed, report.students_checked, report.students_fixed
    );
    Ok(())
}
