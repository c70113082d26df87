use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

/// Gateway transactions; one order may accumulate several attempts.
#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    Reference,
    OrderId,
    Amount,
    Currency,
    Status,
    GatewayStatus,
    AccessCode,
    AuthorizationUrl,
    CustomerEmail,
    Metadata,
    VerifiedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Payments::Reference)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Currency).string_len(3).not_null().default("NGN"))
                    .col(
                        ColumnDef::new(Payments::Status)
                            .custom(Alias::new("gateway_payment_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::gateway_payment_status")),
                    )
                    .col(ColumnDef::new(Payments::GatewayStatus).string_len(50).null())
                    .col(ColumnDef::new(Payments::AccessCode).string_len(100).null())
                    .col(ColumnDef::new(Payments::AuthorizationUrl).text().null())
                    .col(ColumnDef::new(Payments::CustomerEmail).string_len(254).not_null())
                    .col(ColumnDef::new(Payments::Metadata).json_binary().null())
                    .col(ColumnDef::new(Payments::VerifiedAt).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Payments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_order")
                            .from(Payments::Table, Payments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_status_created")
                    .table(Payments::Table)
                    .col(Payments::Status)
                    .col(Payments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Payments::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
