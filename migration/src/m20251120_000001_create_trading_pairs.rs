use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TradingPairs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TradingPairs::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(TradingPairs::Exchange).string().not_null())
                    .col(ColumnDef::new(TradingPairs::BaseCurrency).string().not_null())
                    .col(ColumnDef::new(TradingPairs::QuoteCurrency).string().not_null())
                    .col(ColumnDef::new(TradingPairs::Interval).string().not_null()) // "1m", "1h", "1d"
                    .to_owned(),
            )
            .await?;

        // One row per (exchange, base, quote, interval); the registry re-reads on violation
        manager
            .create_index(
                Index::create()
                    .name("idx_trading_pairs_identity")
                    .table(TradingPairs::Table)
                    .col(TradingPairs::Exchange)
                    .col(TradingPairs::BaseCurrency)
                    .col(TradingPairs::QuoteCurrency)
                    .col(TradingPairs::Interval)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TradingPairs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub(crate) enum TradingPairs {
    Table,
    Id,
    Exchange,
    BaseCurrency,
    QuoteCurrency,
    Interval,
}
