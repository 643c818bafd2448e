use crate::error::{ApiError, Result};
use libsql::{Builder, Connection, Database};
use tracing::info;

pub struct DatabaseManager {
    db: Database,
}

impl DatabaseManager {
    /// Connect to a remote Turso database, or open a local file when the url
    /// has no remote scheme.
    pub async fn new(url: &str, auth_token: Option<&str>) -> Result<Self> {
        let is_remote = ["libsql://", "http://", "https://", "wss://", "ws://"]
            .iter()
            .any(|scheme| url.starts_with(scheme));

        let db = if is_remote {
            let auth_token = auth_token.ok_or_else(|| {
                ApiError::Config("LIBSQL_AUTH_TOKEN is required for a remote database".to_string())
            })?;
            info!("Connecting to Turso database at {}", url);
            Builder::new_remote(url.to_string(), auth_token.to_string())
                .build()
                .await
        } else {
            info!("Opening local libSQL database at {}", url);
            Builder::new_local(url).build().await
        }
        .map_err(|e| ApiError::database(format!("Failed to connect to database: {e}")))?;

        Ok(Self { db })
    }

    /// Get a connection to the database
    pub fn get_connection(&self) -> Result<Connection> {
        self.db
            .connect()
            .map_err(|e| ApiError::database(format!("Failed to get database connection: {e}")))
    }

    /// Run database migrations
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations...");

        let conn = self.get_connection()?;
        let migration_sql = include_str!("../migrations/001_create_documents.sql");

        conn.execute_batch(migration_sql)
            .await
            .map_err(|e| ApiError::database(format!("Failed to run migrations: {e}")))?;

        info!("Database migrations completed successfully");
        Ok(())
    }
}
