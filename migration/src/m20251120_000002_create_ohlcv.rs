use sea_orm_migration::prelude::*;

use crate::m20251120_000001_create_trading_pairs::TradingPairs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ohlcv::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ohlcv::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Ohlcv::Exchange).string().not_null())
                    .col(ColumnDef::new(Ohlcv::Pair).string().not_null()) // "BTC-USD"
                    .col(ColumnDef::new(Ohlcv::Timestamp).string().not_null()) // "YYYY-MM-DD HH:MM:SS"
                    .col(ColumnDef::new(Ohlcv::Open).text().not_null()) // decimal text
                    .col(ColumnDef::new(Ohlcv::High).text().not_null())
                    .col(ColumnDef::new(Ohlcv::Low).text().not_null())
                    .col(ColumnDef::new(Ohlcv::Close).text().not_null())
                    .col(ColumnDef::new(Ohlcv::Volume).text().not_null())
                    .col(ColumnDef::new(Ohlcv::Interval).string().not_null())
                    .col(ColumnDef::new(Ohlcv::TimestampRaw).big_integer().not_null()) // epoch millis
                    .col(ColumnDef::new(Ohlcv::PairId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ohlcv_trading_pair")
                            .from(Ohlcv::Table, Ohlcv::PairId)
                            .to(TradingPairs::Table, TradingPairs::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ohlcv_exchange_pair_interval")
                    .table(Ohlcv::Table)
                    .col(Ohlcv::Exchange)
                    .col(Ohlcv::Pair)
                    .col(Ohlcv::Interval)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ohlcv_pair_id")
                    .table(Ohlcv::Table)
                    .col(Ohlcv::PairId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ohlcv::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Ohlcv {
    Table,
    Id,
    Exchange,
    Pair,
    Timestamp,
    Open,
    High,
    Low,
    Close,
    Volume,
    Interval,
    TimestampRaw,
    PairId,
}
