//! SQLite database pool and queries

mod error;
mod images;
mod models;
mod users;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

pub use error::{DbError, DbResult};
pub use models::{Image, NewImage, User};

/// Database handle shared across handlers. Cheap to clone (wraps a pool).
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Opens the database at the given URL and runs pending migrations
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` if the pool cannot be created and
    /// `DbError::Migration` if a migration fails
    pub async fn connect(url: &str) -> DbResult<Self> {
        if let Some(path) = url.strip_prefix("sqlite://").filter(|p| *p != ":memory:") {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| DbError::Connection(e.to_string()))?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::Connection(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        info!(url, "Database opened");

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Opens an in-memory database with migrations applied
    ///
    /// # Errors
    ///
    /// Returns `DbError::Connection` or `DbError::Migration` on failure
    pub async fn open_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection(e.to_string()))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    async fn run_migrations(&self) -> DbResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;

        info!("Database migrations complete");
        Ok(())
    }

    pub(crate) const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
