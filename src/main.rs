use std::sync::Arc;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use orbit_api::config::ApiConfig;
use orbit_db::{OrbitRepository, PgRepository, create_pool, schema::initialize_database};
use orbit_notifier::config::NotifierConfig;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    let notifier_config = NotifierConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    let repo: Arc<dyn OrbitRepository> = Arc::new(PgRepository::new(db_pool));

    if notifier_config.enabled {
        let jobs_repo = repo.clone();
        tokio::spawn(async move {
            if let Err(e) = orbit_notifier::start_jobs(notifier_config, jobs_repo).await {
                error!("Notifier jobs stopped: {}", e);
            }
        });
    } else {
        info!("Notifier jobs disabled");
    }

    // Start API server
    orbit_api::start_server(config, repo).await?;

    Ok(())
}
