use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use dotenv::dotenv;
use std::time::Duration;

use crate::timestamp::TimestampZone;

/// Rows scanned by the recent-window duplicate check.
pub const DEFAULT_DUPLICATE_WINDOW: u64 = 10;

pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub duplicate_window: u64,
    pub timezone: TimestampZone,
    pub operation_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://ohlcv.db?mode=rwc".to_string(),
            max_connections: 1,
            duplicate_window: DEFAULT_DUPLICATE_WINDOW,
            timezone: TimestampZone::Local,
            operation_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();
        let defaults = Config::default();

        let duplicate_window = match std::env::var("OHLCV_DUPLICATE_WINDOW") {
            Ok(v) => v
                .parse::<u64>()
                .context("OHLCV_DUPLICATE_WINDOW must be a positive integer")?,
            Err(_) => defaults.duplicate_window,
        };
        if duplicate_window == 0 {
            return Err(anyhow!("OHLCV_DUPLICATE_WINDOW must be greater than zero"));
        }

        let max_connections = match std::env::var("DB_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .context("DB_MAX_CONNECTIONS must be an integer")?,
            Err(_) => defaults.max_connections,
        };
        if max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }

        let timezone = match std::env::var("OHLCV_TIMEZONE") {
            Ok(name) => {
                let tz = name
                    .parse::<Tz>()
                    .map_err(|e| anyhow!("invalid OHLCV_TIMEZONE {name:?}: {e}"))?;
                TimestampZone::Named(tz)
            }
            Err(_) => TimestampZone::Local,
        };

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections,
            duplicate_window,
            timezone,
            operation_timeout: match std::env::var("OHLCV_OPERATION_TIMEOUT_SECS") {
                Ok(v) => Some(Duration::from_secs(
                    v.parse().context("OHLCV_OPERATION_TIMEOUT_SECS must be an integer")?,
                )),
                Err(_) => None,
            },
        })
    }
}
