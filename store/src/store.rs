use sea_orm::DatabaseConnection;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::context::OpContext;
use crate::database::Session;
use crate::error::Result;
use crate::repositories::{CandleRepository, PairRegistry, TaRepository};

/// Entry point bundling the registry, candle store and TA reader over one
/// shared session.
pub struct OhlcvStore {
    session: Arc<Session>,
    pairs: PairRegistry,
    candles: CandleRepository,
    ta: TaRepository,
    operation_timeout: Option<Duration>,
}

impl OhlcvStore {
    pub async fn connect(config: &Config) -> Result<Self> {
        let session = Session::connect(config).await?;
        Ok(Self::with_session(Arc::new(session), config))
    }

    /// Wrap an already opened connection.
    pub fn new(conn: DatabaseConnection, config: &Config) -> Self {
        Self::with_session(Arc::new(Session::new(conn)), config)
    }

    pub fn with_session(session: Arc<Session>, config: &Config) -> Self {
        let candles =
            CandleRepository::new(session.clone(), config.duplicate_window, config.timezone);
        Self {
            pairs: PairRegistry::new(session.clone()),
            candles,
            ta: TaRepository::new(session.clone()),
            session,
            operation_timeout: config.operation_timeout,
        }
    }

    pub fn pairs(&self) -> &PairRegistry {
        &self.pairs
    }

    pub fn candles(&self) -> &CandleRepository {
        &self.candles
    }

    pub fn ta(&self) -> &TaRepository {
        &self.ta
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// A fresh context carrying the configured operation timeout, if any.
    pub fn context(&self) -> OpContext {
        match self.operation_timeout {
            Some(timeout) => OpContext::with_timeout(timeout),
            None => OpContext::background(),
        }
    }

    pub async fn close(&self) -> Result<()> {
        self.session.close().await
    }
}
