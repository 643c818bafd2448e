use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};

use social_graph::config::{Config, StorageBackend};
use social_graph::graphql::create_schema;
use social_graph::observability;
use social_graph::server;
use social_graph::storage::Collections;

#[derive(Parser)]
#[command(name = "social_graph")]
#[command(about = "GraphQL API for users, posts, comments and likes")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to a TOML config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the GraphQL HTTP server
    Serve {
        /// Port to run the server on
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage backend: memory or database
        #[arg(long)]
        storage: Option<StorageBackend>,
    },
    /// Print the GraphQL schema in SDL form
    Schema,
}

async fn create_storage(config: &Config) -> Result<Collections> {
    match config.storage.backend {
        StorageBackend::Database => {
            #[cfg(feature = "db")]
            {
                use social_graph::db::DatabaseManager;
                use std::sync::Arc;

                let url = config
                    .storage
                    .url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("LIBSQL_URL must be set for database storage"))?;
                info!("Initializing database storage...");
                let db_manager = DatabaseManager::new(url, config.storage.auth_token.as_deref()).await?;
                db_manager.run_migrations().await?;
                info!("Database storage initialized successfully");
                Ok(Collections::database(Arc::new(db_manager)))
            }
            #[cfg(not(feature = "db"))]
            {
                anyhow::bail!("Database feature not enabled. Rebuild with --features db");
            }
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage (data will not persist)");
            Ok(Collections::in_memory())
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Schema => {
            println!("{}", create_schema(Collections::in_memory()).sdl());
            Ok(())
        }
        Commands::Serve { port, storage } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(storage) = storage {
                config.storage.backend = storage;
            }

            let _log_guard = observability::init_logging(&config.logging.directory)?;
            info!("Starting GraphQL API server on port {}", config.server.port);

            if config.metrics.enabled {
                observability::metrics::init().unwrap_or_else(|e| {
                    warn!("Failed to initialize metrics: {}", e);
                });
            }

            let collections = create_storage(&config).await?;
            let schema = create_schema(collections);

            server::start_server(schema, config.server.port, shutdown_signal()).await
        }
    }
}
