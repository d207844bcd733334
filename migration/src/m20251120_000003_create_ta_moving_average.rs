use sea_orm_migration::prelude::*;

/// The TA computation process owns the rows; the store only reads them back.
#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaMovingAverage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TaMovingAverage::TaDetId).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(TaMovingAverage::Close).text().not_null()) // decimal text
                    .col(ColumnDef::new(TaMovingAverage::Interval).string().not_null())
                    .col(ColumnDef::new(TaMovingAverage::MovingAverage).text().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TaMovingAverage::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TaMovingAverage {
    Table,
    TaDetId,
    Close,
    Interval,
    MovingAverage,
}
