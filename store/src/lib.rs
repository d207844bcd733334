//! Persistence for OHLCV candles and read access to derived TA series.
//!
//! All access goes through one [`Session`] whose lock serializes every
//! operation. Callers resolve a pair id once through [`PairRegistry`], then
//! feed candles to [`CandleRepository`], checking the recent window before
//! each insert (or letting `insert_if_absent` do both).

pub mod config;
pub mod context;
pub mod database;
pub mod entity;
pub mod error;
pub mod models;
pub mod repositories;
pub mod store;
pub mod timestamp;

pub use config::{Config, DEFAULT_DUPLICATE_WINDOW};
pub use context::{Canceller, OpContext};
pub use database::{get_db_connection, Session, SessionGuard};
pub use error::{Result, StoreError};
pub use models::*;
pub use repositories::{CandleRepository, PairRegistry, TaRepository};
pub use store::OhlcvStore;
pub use timestamp::{normalize, RawTimestamp, TimestampZone, TIMESTAMP_FORMAT};
