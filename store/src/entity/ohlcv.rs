//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One stored candle. Rows are append-only.
///
/// Prices and volume are kept as decimal text so they round-trip exactly on
/// every backend; [`crate::models::Candle`] carries them parsed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ohlcv")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exchange: String,
    pub pair: String,
    /// Normalized "YYYY-MM-DD HH:MM:SS" form of `timestamp_raw`
    pub timestamp: String,
    #[sea_orm(column_type = "Text")]
    pub open: String,
    #[sea_orm(column_type = "Text")]
    pub high: String,
    #[sea_orm(column_type = "Text")]
    pub low: String,
    #[sea_orm(column_type = "Text")]
    pub close: String,
    #[sea_orm(column_type = "Text")]
    pub volume: String,
    pub interval: String,
    pub timestamp_raw: i64,
    pub pair_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::trading_pairs::Entity",
        from = "Column::PairId",
        to = "super::trading_pairs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    TradingPairs,
}

impl Related<super::trading_pairs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TradingPairs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
