//! Integration tests for reading back the moving-average series

mod common;

use common::*;
use ohlcv_store::entity::ta_moving_average;
use ohlcv_store::{OpContext, StoreError};
use sea_orm::{ActiveValue, EntityTrait};

#[tokio::test]
async fn test_historical_ta_is_ordered_by_detail_id() {
    let store = setup_store().await;
    {
        let guard = store.session().lock().await;
        let db = guard.connection().unwrap();
        let rows = [(3, "103.5", "101.5"), (1, "101.5", "100.5"), (2, "102.5", "101.25")];
        for (id, close, ma) in rows {
            let row = ta_moving_average::ActiveModel {
                ta_det_id: ActiveValue::Set(id),
                close: ActiveValue::Set(close.to_string()),
                interval: ActiveValue::Set(INTERVAL.to_string()),
                moving_average: ActiveValue::Set(ma.to_string()),
            };
            ta_moving_average::Entity::insert(row).exec(db).await.unwrap();
        }
    }

    let frame = store.ta().historical_ta(&OpContext::background()).await.unwrap();
    assert_eq!(frame.len(), 3);
    assert_eq!(frame.ta_det_id, vec![1, 2, 3]);
    assert_eq!(frame.close, vec![dec("101.5"), dec("102.5"), dec("103.5")]);
    assert_eq!(frame.numeric_column("moving_average"), Some(vec![100.5, 101.25, 101.5]));
    assert_eq!(frame.interval, vec![INTERVAL.to_string(); 3]);
}

#[tokio::test]
async fn test_historical_ta_empty_table() {
    let store = setup_store().await;
    let frame = store.ta().historical_ta(&OpContext::background()).await.unwrap();
    assert!(frame.is_empty());
}

#[tokio::test]
async fn test_missing_ta_table_is_storage_unavailable() {
    let store = setup_unmigrated_store().await;
    let err = store.ta().historical_ta(&OpContext::background()).await.unwrap_err();
    assert!(matches!(err, StoreError::StorageUnavailable { .. }));
}
