//! GroupHerald Telegram Outreach Coordinator
//!
//! Main application entry point

use std::sync::Arc;

use teloxide::Bot;
use tokio::sync::watch;
use tracing::info;

use GroupHerald::{
    config::Settings,
    database::{connection::create_pool, run_migrations, GroupRepository, GroupStore},
    scheduler::{JobSet, Orchestrator},
    services::{GroupDiscovery, MessageDispatcher, StatsAggregator, StatsPublisher},
    telegram::{BotSession, MessagingClient},
    utils::logging,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file writer alive until exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {} outreach coordinator...", GroupHerald::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = GroupHerald::database::connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        acquire_timeout: std::time::Duration::from_secs(30),
        idle_timeout: Some(std::time::Duration::from_secs(600)),
        max_lifetime: Some(std::time::Duration::from_secs(1800)),
    };
    let db_pool = create_pool(&db_config).await?;

    // Run database migrations
    run_migrations(&db_pool).await?;

    // Capability objects the jobs run against
    let store: Arc<dyn GroupStore> = Arc::new(GroupRepository::new(db_pool));
    let bot = Bot::new(&settings.telegram.token);
    let client: Arc<dyn MessagingClient> =
        Arc::new(BotSession::new(bot, settings.telegram.group_ids.clone()));

    let publisher = match &settings.redis {
        Some(redis_config) => {
            info!("Connecting to Redis...");
            Some(StatsPublisher::new(redis_config)?)
        }
        None => None,
    };

    // Wire the jobs and the shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let discovery = GroupDiscovery::new(Arc::clone(&store), Arc::clone(&client));
    let dispatcher = MessageDispatcher::new(
        Arc::clone(&store),
        Arc::clone(&client),
        &settings.dispatch,
        shutdown_rx,
    );
    let aggregator = StatsAggregator::new(Arc::clone(&store), publisher);
    let jobs = Arc::new(JobSet::new(discovery, dispatcher, aggregator));

    let mut orchestrator = Orchestrator::new(jobs, settings.scheduler.clone(), shutdown_tx);
    orchestrator.start();

    info!("GroupHerald is running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    orchestrator.shutdown().await;
    info!("GroupHerald has been shut down.");

    Ok(())
}
