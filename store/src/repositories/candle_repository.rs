//! OHLCV candle persistence
//!
//! Duplicate detection only looks at the most recent `window` rows of a
//! series (by insertion id). A candle that arrives after more than `window`
//! newer rows for the same series is not recognised as a duplicate.

use sea_orm::{
    prelude::*, ActiveValue, DatabaseConnection, FromQueryResult, QueryOrder, QuerySelect, Select,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::OpContext;
use crate::database::Session;
use crate::entity::ohlcv;
use crate::error::Result;
use crate::models::{parse_decimal, Candle, CandleFrame, IngestSummary, RawCandle};
use crate::timestamp::TimestampZone;

pub struct CandleRepository {
    session: Arc<Session>,
    window: u64,
    zone: TimestampZone,
}

fn for_series(exchange: &str, pair: &str, interval: &str) -> Select<ohlcv::Entity> {
    ohlcv::Entity::find()
        .filter(ohlcv::Column::Exchange.eq(exchange))
        .filter(ohlcv::Column::Pair.eq(pair))
        .filter(ohlcv::Column::Interval.eq(interval))
}

/// Price columns of a stored row, still as decimal text.
#[derive(Debug, FromQueryResult)]
struct PriceRow {
    timestamp: i64,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

impl TryFrom<PriceRow> for RawCandle {
    type Error = DbErr;

    fn try_from(row: PriceRow) -> std::result::Result<Self, Self::Error> {
        Ok(RawCandle::new(
            row.timestamp,
            parse_decimal("open", &row.open)?,
            parse_decimal("high", &row.high)?,
            parse_decimal("low", &row.low)?,
            parse_decimal("close", &row.close)?,
            parse_decimal("volume", &row.volume)?,
        ))
    }
}

fn to_candles(rows: Vec<ohlcv::Model>) -> Result<Vec<Candle>> {
    let candles = rows
        .into_iter()
        .map(Candle::try_from)
        .collect::<std::result::Result<Vec<_>, DbErr>>()?;
    Ok(candles)
}

async fn recent_match(
    db: &DatabaseConnection,
    window: u64,
    exchange: &str,
    pair: &str,
    interval: &str,
    normalized: &str,
) -> Result<bool> {
    let recent = for_series(exchange, pair, interval)
        .order_by_desc(ohlcv::Column::Id)
        .limit(window)
        .all(db)
        .await?;

    Ok(recent
        .iter()
        .any(|row| row.timestamp == normalized && row.exchange == exchange && row.pair == pair))
}

async fn insert_row(
    db: &DatabaseConnection,
    exchange: &str,
    pair: &str,
    interval: &str,
    candle: &RawCandle,
    normalized: String,
    pair_id: i64,
) -> Result<i64> {
    let row = ohlcv::ActiveModel {
        exchange: ActiveValue::Set(exchange.to_string()),
        pair: ActiveValue::Set(pair.to_string()),
        timestamp: ActiveValue::Set(normalized),
        open: ActiveValue::Set(candle.open.to_string()),
        high: ActiveValue::Set(candle.high.to_string()),
        low: ActiveValue::Set(candle.low.to_string()),
        close: ActiveValue::Set(candle.close.to_string()),
        volume: ActiveValue::Set(candle.volume.to_string()),
        interval: ActiveValue::Set(interval.to_string()),
        timestamp_raw: ActiveValue::Set(candle.timestamp),
        pair_id: ActiveValue::Set(pair_id),
        ..Default::default()
    };

    let res = ohlcv::Entity::insert(row).exec(db).await?;
    info!("Adding candle with timestamp: {}", candle.timestamp);
    Ok(res.last_insert_id)
}

impl CandleRepository {
    /// A `window` of 0 is raised to 1 so a candle is always compared
    /// against at least the newest row of its series.
    pub fn new(session: Arc<Session>, window: u64, zone: TimestampZone) -> Self {
        if window == 0 {
            warn!("Duplicate window of 0 raised to 1");
        }
        let window = window.max(1);
        Self {
            session,
            window,
            zone,
        }
    }

    /// Number of recent rows `has_recent` compares against.
    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn zone(&self) -> TimestampZone {
        self.zone
    }

    /// Append one candle row and return its id.
    ///
    /// Does not check for duplicates. Call [`Self::has_recent`] first, or use
    /// [`Self::insert_if_absent`] which does both under one lock.
    pub async fn insert(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
        candle: &RawCandle,
        pair_id: i64,
    ) -> Result<i64> {
        let normalized = self.zone.normalize(&candle.timestamp)?;
        ctx.run(async {
            let guard = self.session.lock().await;
            let db = guard.connection()?;
            insert_row(db, exchange, pair, interval, candle, normalized, pair_id).await
        })
        .await
    }

    /// Insert the candle unless the recent window already holds it.
    /// Returns the new row id, or `None` when skipped.
    pub async fn insert_if_absent(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
        candle: &RawCandle,
        pair_id: i64,
    ) -> Result<Option<i64>> {
        let normalized = self.zone.normalize(&candle.timestamp)?;
        ctx.run(async {
            let guard = self.session.lock().await;
            let db = guard.connection()?;

            debug!("Checking for candle with timestamp: {}", candle.timestamp);
            if recent_match(db, self.window, exchange, pair, interval, &normalized).await? {
                debug!("Skipping duplicate candle with timestamp: {}", candle.timestamp);
                return Ok(None);
            }
            let id = insert_row(db, exchange, pair, interval, candle, normalized, pair_id).await?;
            Ok(Some(id))
        })
        .await
    }

    /// Store a batch from the exchange client, skipping recent duplicates.
    pub async fn ingest(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
        pair_id: i64,
        candles: &[RawCandle],
    ) -> Result<IngestSummary> {
        let mut summary = IngestSummary::default();
        for candle in candles {
            match self
                .insert_if_absent(ctx, exchange, pair, interval, candle, pair_id)
                .await?
            {
                Some(_) => summary.inserted += 1,
                None => summary.skipped += 1,
            }
        }
        info!(
            "Ingested {} {} {}: {} inserted, {} skipped",
            exchange, pair, interval, summary.inserted, summary.skipped
        );
        Ok(summary)
    }

    /// Row with the greatest raw timestamp for the series.
    pub async fn latest(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
    ) -> Result<Option<Candle>> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let row = for_series(exchange, pair, interval)
                .order_by_desc(ohlcv::Column::TimestampRaw)
                .one(guard.connection()?)
                .await?;
            Ok(row.map(Candle::try_from).transpose()?)
        })
        .await
    }

    /// Up to `n` rows, newest raw timestamp first.
    pub async fn latest_n(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
        n: u64,
    ) -> Result<Vec<Candle>> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let rows = for_series(exchange, pair, interval)
                .order_by_desc(ohlcv::Column::TimestampRaw)
                .limit(n)
                .all(guard.connection()?)
                .await?;
            to_candles(rows)
        })
        .await
    }

    /// The `n` most recently inserted rows as columns, newest insert first.
    pub async fn latest_n_as_table(
        &self,
        ctx: &OpContext,
        exchange: &str,
        pair: &str,
        interval: &str,
        n: u64,
    ) -> Result<CandleFrame> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let rows = for_series(exchange, pair, interval)
                .order_by_desc(ohlcv::Column::Id)
                .limit(n)
                .all(guard.connection()?)
                .await?;
            Ok(to_candles(rows)?.into_iter().collect())
        })
        .await
    }

    /// Every candle stored under `pair_id`, in no particular order.
    pub async fn all_for_pair(&self, ctx: &OpContext, pair_id: i64) -> Result<Vec<RawCandle>> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let rows = ohlcv::Entity::find()
                .select_only()
                .column_as(ohlcv::Column::TimestampRaw, "timestamp")
                .column(ohlcv::Column::Open)
                .column(ohlcv::Column::High)
                .column(ohlcv::Column::Low)
                .column(ohlcv::Column::Close)
                .column(ohlcv::Column::Volume)
                .filter(ohlcv::Column::PairId.eq(pair_id))
                .into_model::<PriceRow>()
                .all(guard.connection()?)
                .await?;
            let candles = rows
                .into_iter()
                .map(RawCandle::try_from)
                .collect::<std::result::Result<Vec<_>, DbErr>>()?;
            Ok(candles)
        })
        .await
    }

    /// Whether one of the `window` most recently inserted rows of the series
    /// carries the same normalized timestamp as `candle`.
    pub async fn has_recent(
        &self,
        ctx: &OpContext,
        candle: &RawCandle,
        exchange: &str,
        pair: &str,
        interval: &str,
    ) -> Result<bool> {
        debug!("Checking for candle with timestamp: {}", candle.timestamp);
        let normalized = self.zone.normalize(&candle.timestamp)?;
        ctx.run(async {
            let guard = self.session.lock().await;
            let db = guard.connection()?;
            recent_match(db, self.window, exchange, pair, interval, &normalized).await
        })
        .await
    }
}
