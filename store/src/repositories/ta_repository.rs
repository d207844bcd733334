use sea_orm::{prelude::*, QueryOrder};
use std::sync::Arc;

use crate::context::OpContext;
use crate::database::Session;
use crate::entity::ta_moving_average;
use crate::error::Result;
use crate::models::TaFrame;

/// Read access to the moving-average series written by the TA process.
pub struct TaRepository {
    session: Arc<Session>,
}

impl TaRepository {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// The whole series, oldest detail id first.
    pub async fn historical_ta(&self, ctx: &OpContext) -> Result<TaFrame> {
        ctx.run(async {
            let guard = self.session.lock().await;
            let rows = ta_moving_average::Entity::find()
                .order_by_asc(ta_moving_average::Column::TaDetId)
                .all(guard.connection()?)
                .await?;
            Ok(TaFrame::from_rows(rows)?)
        })
        .await
    }
}
