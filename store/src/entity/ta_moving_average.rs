//! `SeaORM` Entity, @generated manually
//!
//! Written by the external TA computation process. Read-only here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ta_moving_average")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub ta_det_id: i64,
    #[sea_orm(column_type = "Text")]
    pub close: String,
    pub interval: String,
    #[sea_orm(column_type = "Text")]
    pub moving_average: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
