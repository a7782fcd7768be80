//! WorkshopHub workshop registration platform
//!
//! Main application entry point

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use WorkshopHub::{
    config::Settings,
    database::{self, seed, DatabaseService},
    handlers::{build_router, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[derive(Parser)]
#[command(name = "workshophub", version, about = "Workshop registration platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the initial school and workshop data, then exit
    Seed,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard must live until shutdown
    let _guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", WorkshopHub::info());

    // Initialize database connection
    info!("Connecting to database...");
    let pool = database::create_pool(&settings.database).await?;
    database::run_migrations(&pool).await?;

    let db = DatabaseService::new(pool.clone());

    if let Some(Command::Seed) = cli.command {
        seed::seed_initial_data(&db).await?;
        info!("Seed data loaded");
        return Ok(());
    }

    // Initialize services
    info!("Initializing services...");
    let services = ServiceFactory::new(db.clone(), settings.clone())?;

    let state = Arc::new(AppState::new(settings.clone(), pool, db, services)?);
    let app = build_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
    info!("Shutdown signal received");
}
