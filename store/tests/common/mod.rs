#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use ohlcv_store::{get_db_connection, Config, OhlcvStore, RawCandle, TimestampZone};
use rust_decimal::Decimal;

pub const EXCHANGE: &str = "binance";
pub const PAIR: &str = "BTC-USD";
pub const INTERVAL: &str = "1h";
pub const HOUR_MS: i64 = 3_600_000;

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        timezone: TimestampZone::Named(chrono_tz::UTC),
        ..Config::default()
    }
}

/// In-memory store with the schema applied.
pub async fn setup_store() -> OhlcvStore {
    setup_store_with(test_config()).await
}

pub async fn setup_store_with(config: Config) -> OhlcvStore {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let db = get_db_connection(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    OhlcvStore::new(db, &config)
}

/// In-memory store without any tables.
pub async fn setup_unmigrated_store() -> OhlcvStore {
    let config = test_config();
    let db = get_db_connection(&config).await.unwrap();
    OhlcvStore::new(db, &config)
}

pub fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
}

pub fn create_test_candle(timestamp: i64, close: &str) -> RawCandle {
    RawCandle::new(timestamp, dec("100.5"), dec("110.25"), dec("95.75"), dec(close), dec("12.5"))
}

/// `count` hourly candles starting at `start`.
pub fn create_test_candles(count: usize, start: i64) -> Vec<RawCandle> {
    (0..count)
        .map(|i| create_test_candle(start + i as i64 * HOUR_MS, "105.5"))
        .collect()
}
