use sea_orm::{prelude::*, ActiveValue, DatabaseConnection, Select, SqlErr};
use std::sync::Arc;
use tracing::{info, warn};

use crate::context::OpContext;
use crate::database::Session;
use crate::entity::trading_pairs;
use crate::error::{Result, StoreError};
use crate::models::TradingPair;

/// Maps (exchange, base, quote, interval) to a stable pair id.
pub struct PairRegistry {
    session: Arc<Session>,
}

fn by_identity(
    exchange: &str,
    base: &str,
    quote: &str,
    interval: &str,
) -> Select<trading_pairs::Entity> {
    trading_pairs::Entity::find()
        .filter(trading_pairs::Column::Exchange.eq(exchange))
        .filter(trading_pairs::Column::BaseCurrency.eq(base))
        .filter(trading_pairs::Column::QuoteCurrency.eq(quote))
        .filter(trading_pairs::Column::Interval.eq(interval))
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Insert a pair the caller did not find. When the unique index says the
/// pair exists after all, the stored row's id is returned.
pub(crate) async fn register(
    db: &DatabaseConnection,
    exchange: &str,
    base: &str,
    quote: &str,
    interval: &str,
) -> Result<i64> {
    let pair = trading_pairs::ActiveModel {
        exchange: ActiveValue::Set(exchange.to_string()),
        base_currency: ActiveValue::Set(base.to_string()),
        quote_currency: ActiveValue::Set(quote.to_string()),
        interval: ActiveValue::Set(interval.to_string()),
        ..Default::default()
    };

    match trading_pairs::Entity::insert(pair).exec(db).await {
        Ok(res) => {
            info!(
                "Registered trading pair {} {}/{} ({}) as {}",
                exchange, base, quote, interval, res.last_insert_id
            );
            Ok(res.last_insert_id)
        }
        Err(err) if is_unique_violation(&err) => {
            warn!(
                "Trading pair {} {}/{} ({}) already registered, re-reading",
                exchange, base, quote, interval
            );
            by_identity(exchange, base, quote, interval)
                .one(db)
                .await?
                .map(|pair| pair.id)
                .ok_or_else(|| StoreError::DuplicatePairConflict {
                    exchange: exchange.to_string(),
                    base: base.to_string(),
                    quote: quote.to_string(),
                    interval: interval.to_string(),
                })
        }
        Err(err) => Err(err.into()),
    }
}

impl PairRegistry {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub async fn find(
        &self,
        ctx: &OpContext,
        exchange: &str,
        base: &str,
        quote: &str,
        interval: &str,
    ) -> Result<Option<TradingPair>> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let pair = by_identity(exchange, base, quote, interval)
                .one(guard.connection()?)
                .await?;
            Ok(pair)
        })
        .await
    }

    /// Return the id of the matching pair, registering it first if needed.
    ///
    /// Lookup and insert happen under one lock acquisition. If another writer
    /// outside this session registers the pair in between, the unique index
    /// rejects our insert and the existing row is returned instead.
    pub async fn resolve_or_create(
        &self,
        ctx: &OpContext,
        exchange_id: &str,
        base: &str,
        quote: &str,
        interval: &str,
    ) -> Result<i64> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let db = guard.connection()?;

            if let Some(pair) = by_identity(exchange_id, base, quote, interval).one(db).await? {
                return Ok(pair.id);
            }

            register(db, exchange_id, base, quote, interval).await
        })
        .await
    }
}
