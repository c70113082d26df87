use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

/// discount_value is basis points for percentage codes, kobo for fixed codes.
#[derive(DeriveIden)]
enum PromoCodes {
    Table,
    Id,
    Code,
    Description,
    DiscountType,
    DiscountValue,
    MinimumOrderAmount,
    MaximumDiscount,
    IsActive,
    UsageLimit,
    CurrentUsage,
    ValidFrom,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PromoCodeUsages {
    Table,
    Id,
    PromoCodeId,
    UserId,
    OrderId,
    DiscountAmount,
    UsedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PromoCodes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoCodes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PromoCodes::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(PromoCodes::DiscountType)
                            .custom(Alias::new("discount_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(PromoCodes::DiscountValue).big_integer().not_null())
                    .col(
                        ColumnDef::new(PromoCodes::MinimumOrderAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PromoCodes::MaximumDiscount).big_integer().null())
                    .col(ColumnDef::new(PromoCodes::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(PromoCodes::UsageLimit).integer().not_null().default(0))
                    .col(ColumnDef::new(PromoCodes::CurrentUsage).integer().not_null().default(0))
                    .col(ColumnDef::new(PromoCodes::ValidFrom).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PromoCodes::ValidUntil).timestamp_with_time_zone().not_null())
                    .col(
                        ColumnDef::new(PromoCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(PromoCodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PromoCodeUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PromoCodeUsages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PromoCodeUsages::PromoCodeId).big_integer().not_null())
                    .col(ColumnDef::new(PromoCodeUsages::UserId).big_integer().null())
                    .col(ColumnDef::new(PromoCodeUsages::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(PromoCodeUsages::DiscountAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PromoCodeUsages::UsedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promo_code_usages_code")
                            .from(PromoCodeUsages::Table, PromoCodeUsages::PromoCodeId)
                            .to(PromoCodes::Table, PromoCodes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promo_code_usages_user")
                            .from(PromoCodeUsages::Table, PromoCodeUsages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_promo_code_usages_order")
                            .from(PromoCodeUsages::Table, PromoCodeUsages::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // A code counts once per order
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_code_usages_code_order")
                    .table(PromoCodeUsages::Table)
                    .col(PromoCodeUsages::PromoCodeId)
                    .col(PromoCodeUsages::OrderId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // And once per signed-in user. Guest rows have a NULL user_id, and
        // Postgres never treats NULLs as equal, so guests are not limited.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_promo_code_usages_code_user")
                    .table(PromoCodeUsages::Table)
                    .col(PromoCodeUsages::PromoCodeId)
                    .col(PromoCodeUsages::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromoCodeUsages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PromoCodes::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
