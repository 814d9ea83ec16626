// cmdext-core/src/db/mod.rs

use std::str::FromStr;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};
use crate::Error;

const CREATE_CUSTOM_COMMANDS: &str = r#"
CREATE TABLE IF NOT EXISTS CustomCommands (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    CommandName TEXT NOT NULL UNIQUE COLLATE NOCASE,
    Response TEXT NOT NULL,
    RequiredRole TEXT NOT NULL DEFAULT 'Everyone',
    UserCooldownSeconds INTEGER NOT NULL DEFAULT 5,
    GlobalCooldownSeconds INTEGER NOT NULL DEFAULT 0,
    IsEnabled INTEGER NOT NULL DEFAULT 1,
    CreatedAt TEXT NOT NULL,
    UpdatedAt TEXT NOT NULL
)
"#;

const CREATE_SCHEDULED_TASKS: &str = r#"
CREATE TABLE IF NOT EXISTS ScheduledTasks (
    Id INTEGER PRIMARY KEY AUTOINCREMENT,
    TaskName TEXT NOT NULL UNIQUE COLLATE NOCASE,
    Message TEXT NOT NULL,
    IntervalMinutes INTEGER NOT NULL,
    IsEnabled INTEGER NOT NULL DEFAULT 1,
    CreatedAt TEXT NOT NULL,
    UpdatedAt TEXT NOT NULL
)
"#;

/// SQLite-backed store holding the `CustomCommands` and `ScheduledTasks` tables.
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open (or create) the database at `database_url`.
    ///
    /// `":memory:"` gives a private in-memory database, which is what the tests use.
    /// Any other value is treated as a file path relative to the working directory;
    /// missing parent directories are created.
    pub async fn new(database_url: &str) -> Result<Self, Error> {
        let pool = if database_url == ":memory:" {
            // Every pooled connection to :memory: would be its own empty database,
            // so pin the pool to a single connection that never expires.
            let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            let path = std::env::current_dir()?.join(database_url);
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            info!("Opening SQLite database at {}", path.display());
            let opts = SqliteConnectOptions::new()
                .filename(&path)
                .create_if_missing(true);
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await?
        };

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    /// Create both tables if they are missing. Safe to call repeatedly.
    pub async fn init_schema(&self) -> Result<(), Error> {
        sqlx::query(CREATE_CUSTOM_COMMANDS).execute(&self.pool).await?;
        sqlx::query(CREATE_SCHEDULED_TASKS).execute(&self.pool).await?;
        debug!("Schema ready (CustomCommands, ScheduledTasks)");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
