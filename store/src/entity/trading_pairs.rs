//! `SeaORM` Entity, @generated manually

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trading_pairs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exchange: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub interval: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ohlcv::Entity")]
    Ohlcv,
}

impl Related<super::ohlcv::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ohlcv.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
