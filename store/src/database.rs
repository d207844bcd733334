use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::config::Config;
use crate::error::{Result, StoreError};

pub async fn get_db_connection(config: &Config) -> Result<DatabaseConnection> {
    if config.max_connections == 0 {
        return Err(DbErr::Custom("max_connections must be at least 1".to_string()).into());
    }
    info!("Connecting to database via Sea-ORM at: {}", config.database_url);
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    Ok(db)
}

/// The one connection every store operation goes through.
///
/// The mutex around it is the serialization lock: reads and writes alike hold
/// it for their whole duration, so no two operations ever overlap.
#[derive(Debug)]
pub struct Session {
    conn: Mutex<Option<DatabaseConnection>>,
}

/// Exclusive access to the session connection, released on drop.
pub struct SessionGuard<'a> {
    conn: MutexGuard<'a, Option<DatabaseConnection>>,
}

impl SessionGuard<'_> {
    pub fn connection(&self) -> Result<&DatabaseConnection> {
        self.conn.as_ref().ok_or_else(StoreError::session_closed)
    }
}

impl Session {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    pub async fn connect(config: &Config) -> Result<Self> {
        let db = get_db_connection(config).await?;
        info!("Connected to database successfully");
        Ok(Self::new(db))
    }

    /// Wait for the serialization lock.
    pub async fn lock(&self) -> SessionGuard<'_> {
        SessionGuard {
            conn: self.conn.lock().await,
        }
    }

    /// Close the connection after in-flight operations finish. Operations
    /// issued afterwards fail with `StorageUnavailable`.
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(db) = conn {
            db.close().await?;
            info!("Database session closed");
        }
        Ok(())
    }

    pub async fn is_closed(&self) -> bool {
        self.conn.lock().await.is_none()
    }
}
