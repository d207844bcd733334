pub use sea_orm_migration::prelude::*;

mod m20251120_000001_create_trading_pairs;
mod m20251120_000002_create_ohlcv;
mod m20251120_000003_create_ta_moving_average;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251120_000001_create_trading_pairs::Migration),
            Box::new(m20251120_000002_create_ohlcv::Migration),
            Box::new(m20251120_000003_create_ta_moving_average::Migration),
        ]
    }
}
