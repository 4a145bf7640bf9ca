use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use orbit_api::config::parse_log_level;
use orbit_db::{PgRepository, create_pool, schema::initialize_database};
use orbit_notifier::config::NotifierConfig;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Initialize logging
    let log_level = parse_log_level(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()));
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Orbit notifier");

    let config = NotifierConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    // Runs regardless of NOTIFIER_ENABLED, which only governs the in-process jobs
    match orbit_notifier::start_jobs(config, Arc::new(PgRepository::new(db_pool))).await {
        Ok(_) => info!("Notifier shut down gracefully"),
        Err(e) => error!("Notifier error: {}", e),
    }

    Ok(())
}
