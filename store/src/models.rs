use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entity::{ohlcv, ta_moving_average};

/// A trading pair registry row.
pub type TradingPair = crate::entity::trading_pairs::Model;

/// Read a decimal stored as text. Accepts plain and scientific notation.
pub(crate) fn parse_decimal(column: &str, text: &str) -> Result<Decimal, DbErr> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| DbErr::Type(format!("column {column}: {text:?} is not a decimal: {e}")))
}

/// A stored candle with its prices parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub id: i64,
    pub exchange: String,
    pub pair: String,
    /// Normalized "YYYY-MM-DD HH:MM:SS" form of `timestamp_raw`
    pub timestamp: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub interval: String,
    pub timestamp_raw: i64,
    pub pair_id: i64,
}

impl TryFrom<ohlcv::Model> for Candle {
    type Error = DbErr;

    fn try_from(row: ohlcv::Model) -> Result<Self, Self::Error> {
        Ok(Candle {
            open: parse_decimal("open", &row.open)?,
            high: parse_decimal("high", &row.high)?,
            low: parse_decimal("low", &row.low)?,
            close: parse_decimal("close", &row.close)?,
            volume: parse_decimal("volume", &row.volume)?,
            id: row.id,
            exchange: row.exchange,
            pair: row.pair,
            timestamp: row.timestamp,
            interval: row.interval,
            timestamp_raw: row.timestamp_raw,
            pair_id: row.pair_id,
        })
    }
}

/// A candle as the exchange client hands it over, in
/// `(timestamp, open, high, low, close, volume)` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandle {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

type CandleTuple = (i64, Decimal, Decimal, Decimal, Decimal, Decimal);

impl RawCandle {
    pub fn new(
        timestamp: i64,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl From<CandleTuple> for RawCandle {
    fn from((timestamp, open, high, low, close, volume): CandleTuple) -> Self {
        Self::new(timestamp, open, high, low, close, volume)
    }
}

impl From<RawCandle> for CandleTuple {
    fn from(c: RawCandle) -> Self {
        (c.timestamp, c.open, c.high, c.low, c.close, c.volume)
    }
}

impl From<&Candle> for RawCandle {
    fn from(row: &Candle) -> Self {
        Self::new(row.timestamp_raw, row.open, row.high, row.low, row.close, row.volume)
    }
}

/// Outcome of a batch ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub inserted: usize,
    pub skipped: usize,
}

fn decimals_to_f64(values: &[Decimal]) -> Vec<f64> {
    values.iter().map(|d| d.to_f64().unwrap_or(f64::NAN)).collect()
}

/// Column-oriented candle rows for numeric consumers. Row order is the
/// order the rows were pushed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleFrame {
    pub id: Vec<i64>,
    pub exchange: Vec<String>,
    pub pair: Vec<String>,
    pub timestamp: Vec<String>,
    pub open: Vec<Decimal>,
    pub high: Vec<Decimal>,
    pub low: Vec<Decimal>,
    pub close: Vec<Decimal>,
    pub volume: Vec<Decimal>,
    pub interval: Vec<String>,
    pub timestamp_raw: Vec<i64>,
    pub pair_id: Vec<i64>,
}

impl CandleFrame {
    pub const COLUMNS: [&'static str; 12] = [
        "id",
        "exchange",
        "pair",
        "timestamp",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "interval",
        "timestamp_raw",
        "pair_id",
    ];

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty()
    }

    pub fn push(&mut self, row: Candle) {
        self.id.push(row.id);
        self.exchange.push(row.exchange);
        self.pair.push(row.pair);
        self.timestamp.push(row.timestamp);
        self.open.push(row.open);
        self.high.push(row.high);
        self.low.push(row.low);
        self.close.push(row.close);
        self.volume.push(row.volume);
        self.interval.push(row.interval);
        self.timestamp_raw.push(row.timestamp_raw);
        self.pair_id.push(row.pair_id);
    }

    pub fn row(&self, index: usize) -> Option<Candle> {
        if index >= self.len() {
            return None;
        }
        Some(Candle {
            id: self.id[index],
            exchange: self.exchange[index].clone(),
            pair: self.pair[index].clone(),
            timestamp: self.timestamp[index].clone(),
            open: self.open[index],
            high: self.high[index],
            low: self.low[index],
            close: self.close[index],
            volume: self.volume[index],
            interval: self.interval[index].clone(),
            timestamp_raw: self.timestamp_raw[index],
            pair_id: self.pair_id[index],
        })
    }

    /// A price/volume column as `f64`, or `None` for non-numeric columns.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let values = match name {
            "open" => &self.open,
            "high" => &self.high,
            "low" => &self.low,
            "close" => &self.close,
            "volume" => &self.volume,
            _ => return None,
        };
        Some(decimals_to_f64(values))
    }
}

impl FromIterator<Candle> for CandleFrame {
    fn from_iter<I: IntoIterator<Item = Candle>>(iter: I) -> Self {
        let mut frame = CandleFrame::default();
        for row in iter {
            frame.push(row);
        }
        frame
    }
}

/// Column-oriented moving-average series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaFrame {
    pub ta_det_id: Vec<i64>,
    pub close: Vec<Decimal>,
    pub interval: Vec<String>,
    pub moving_average: Vec<Decimal>,
}

impl TaFrame {
    pub const COLUMNS: [&'static str; 4] = ["ta_det_id", "close", "interval", "moving_average"];

    pub fn columns(&self) -> &'static [&'static str] {
        &Self::COLUMNS
    }

    pub fn len(&self) -> usize {
        self.ta_det_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ta_det_id.is_empty()
    }

    pub fn push(&mut self, row: ta_moving_average::Model) -> Result<(), DbErr> {
        let close = parse_decimal("close", &row.close)?;
        let moving_average = parse_decimal("moving_average", &row.moving_average)?;
        self.ta_det_id.push(row.ta_det_id);
        self.close.push(close);
        self.interval.push(row.interval);
        self.moving_average.push(moving_average);
        Ok(())
    }

    pub fn from_rows(rows: Vec<ta_moving_average::Model>) -> Result<Self, DbErr> {
        let mut frame = TaFrame::default();
        for row in rows {
            frame.push(row)?;
        }
        Ok(frame)
    }

    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        match name {
            "close" => Some(decimals_to_f64(&self.close)),
            "moving_average" => Some(decimals_to_f64(&self.moving_average)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(id: i64, close: i64) -> Candle {
        Candle {
            id,
            exchange: "binance".to_string(),
            pair: "BTC-USD".to_string(),
            timestamp: "2021-05-03 00:00:00".to_string(),
            open: Decimal::new(100, 0),
            high: Decimal::new(110, 0),
            low: Decimal::new(95, 0),
            close: Decimal::new(close, 0),
            volume: Decimal::new(15, 1),
            interval: "1h".to_string(),
            timestamp_raw: 1620000000000 + id * 3_600_000,
            pair_id: 1,
        }
    }

    #[test]
    fn test_raw_candle_from_tuple() {
        let d = |v: i64| Decimal::new(v, 0);
        let raw: RawCandle = (1620000000000, d(1), d(2), d(3), d(4), d(5)).into();
        assert_eq!(raw.timestamp, 1620000000000);
        assert_eq!(raw.close, d(4));
        let back: (i64, Decimal, Decimal, Decimal, Decimal, Decimal) = raw.into();
        assert_eq!(back.5, d(5));
    }

    #[test]
    fn test_candle_frame_columns() {
        let frame: CandleFrame = vec![candle(2, 105), candle(1, 101)].into_iter().collect();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.columns().len(), 12);
        assert_eq!(frame.id, vec![2, 1]);
        assert_eq!(frame.numeric_column("close"), Some(vec![105.0, 101.0]));
        assert_eq!(frame.numeric_column("volume"), Some(vec![1.5, 1.5]));
        assert!(frame.numeric_column("pair").is_none());
        assert_eq!(frame.row(1), Some(candle(1, 101)));
        assert!(frame.row(2).is_none());
    }

    #[test]
    fn test_frames_serialize_as_columns() {
        let frame: CandleFrame = vec![candle(1, 101)].into_iter().collect();
        let json = serde_json::to_value(&frame).unwrap();
        for column in CandleFrame::COLUMNS {
            assert!(json.get(column).is_some(), "missing column {column}");
        }

        let ta = TaFrame::default();
        assert!(ta.is_empty());
        assert_eq!(ta.columns(), &TaFrame::COLUMNS);
    }

    #[test]
    fn test_parse_decimal_is_exact() {
        let volume = parse_decimal("volume", "123456789012.12345678").unwrap();
        assert_eq!(volume, Decimal::from_str("123456789012.12345678").unwrap());
        assert_eq!(volume.to_string(), "123456789012.12345678");
        assert_eq!(parse_decimal("close", " 1.5e3 ").unwrap(), Decimal::new(1500, 0));
        assert!(matches!(parse_decimal("close", "abc"), Err(DbErr::Type(_))));
    }

    #[test]
    fn test_candle_from_stored_row() {
        let row = ohlcv::Model {
            id: 4,
            exchange: "binance".to_string(),
            pair: "SHIB-USDT".to_string(),
            timestamp: "2021-05-03 00:00:00".to_string(),
            open: "0.00002731".to_string(),
            high: "0.00002790".to_string(),
            low: "0.00002700".to_string(),
            close: "0.00002755".to_string(),
            volume: "98765432109876.5".to_string(),
            interval: "1h".to_string(),
            timestamp_raw: 1620000000000,
            pair_id: 2,
        };
        let candle = Candle::try_from(row.clone()).unwrap();
        assert_eq!(candle.open, Decimal::new(2731, 8));
        assert_eq!(candle.volume, Decimal::new(987654321098765, 1));

        let broken = ohlcv::Model {
            volume: "n/a".to_string(),
            ..row
        };
        assert!(Candle::try_from(broken).is_err());
    }

    #[test]
    fn test_ta_frame_rejects_bad_text() {
        let row = ta_moving_average::Model {
            ta_det_id: 1,
            close: "101.5".to_string(),
            interval: "1h".to_string(),
            moving_average: "".to_string(),
        };
        assert!(TaFrame::from_rows(vec![row]).is_err());
    }
}
