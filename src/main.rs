use clap::Parser;
use pantry_chef::{
    api::{handlers::AppState, routes},
    cli::{commands, Cli, Commands},
    config::Settings,
    db,
    llm::GeminiClient,
    store::{build_embedder, SqliteCollection, COLLECTION_NAME},
    Error, Result,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    // Silently ignore if file doesn't exist
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pantry_chef=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle commands
    match cli.command {
        Commands::Serve { port, host } => {
            let settings = load_settings()?;
            serve(settings, port, host).await?;
        }
        Commands::Ingest { input } => {
            let settings = load_settings()?;
            let collection = open_collection(&settings).await?;
            commands::ingest(&collection, &input).await?;
        }
        Commands::Count => {
            let settings = load_settings()?;
            let collection = open_collection(&settings).await?;
            commands::count(&collection).await?;
        }
        Commands::Recommend {
            ingredients,
            constraints,
            server,
        } => {
            commands::recommend(&server, ingredients, constraints).await?;
        }
        Commands::Status { server } => {
            commands::status(&server).await?;
        }
    }

    Ok(())
}

/// Load and validate configuration; a missing GEMINI_API_KEY stops here
fn load_settings() -> Result<Settings> {
    let settings = Settings::from_env()?;
    settings.validate()?;
    Ok(settings)
}

/// Open the recipe collection with the configured embedder
async fn open_collection(settings: &Settings) -> Result<SqliteCollection> {
    let pool = db::init_pool_with_config(&settings.database).await?;
    info!(
        "Database connection established (max_connections: {}, min_connections: {})",
        settings.database.max_connections, settings.database.min_connections
    );

    db::run_migrations(&pool).await?;
    info!("Database migrations completed");

    let embedder = build_embedder(settings)?;
    SqliteCollection::open(pool, COLLECTION_NAME, embedder).await
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    // Override settings with CLI arguments
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Pantry Chef server");
    info!("Database: {}", settings.database.url);
    info!("Server: {}:{}", settings.server.host, settings.server.port);

    let collection = open_collection(&settings).await?;
    let record_count = pantry_chef::store::VectorStore::count(&collection).await?;
    info!("Collection '{}' holds {} records", COLLECTION_NAME, record_count);

    let generator = GeminiClient::new(settings.gemini.clone())?;
    info!("Generation model: {}", generator.model());

    let state = AppState::new(Arc::new(collection), Arc::new(generator));
    let app = routes::create_router(state, &settings.server);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    println!("\n========================================");
    println!("Pantry Chef");
    println!("========================================");
    println!("Status: Running");
    println!("Address: http://{addr}");
    println!("Recipes indexed: {record_count}");
    println!("Model: {}", settings.gemini.model);
    println!("\nAPI Endpoints:");
    println!("  GET  /");
    println!("  POST /recommend");
    println!("\nPress Ctrl+C to stop");
    println!("========================================\n");

    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
