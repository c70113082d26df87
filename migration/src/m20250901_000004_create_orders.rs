use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum MenuItems {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    UserId,
    GuestName,
    GuestEmail,
    GuestPhone,
    DeliveryType,
    DeliveryAddress,
    Latitude,
    Longitude,
    SpecialInstructions,
    Subtotal,
    TaxAmount,
    DeliveryFee,
    DiscountAmount,
    TotalAmount,
    Status,
    PaymentStatus,
    PaymentMethod,
    PromoCodeId,
    UserRewardId,
    EstimatedDeliveryTime,
    ActualDeliveryTime,
    PaymentReference,
    PaymentVerifiedAt,
    PointsAwarded,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OrderItems {
    Table,
    Id,
    OrderId,
    MenuItemId,
    ItemName,
    Quantity,
    UnitPrice,
    TotalPrice,
    SpecialInstructions,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Orders::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Orders::OrderNumber)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::UserId).big_integer().null())
                    .col(ColumnDef::new(Orders::GuestName).string_len(255).null())
                    .col(ColumnDef::new(Orders::GuestEmail).string_len(254).null())
                    .col(ColumnDef::new(Orders::GuestPhone).string_len(32).null())
                    .col(
                        ColumnDef::new(Orders::DeliveryType)
                            .custom(Alias::new("delivery_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::DeliveryAddress).text().null())
                    .col(ColumnDef::new(Orders::Latitude).double().null())
                    .col(ColumnDef::new(Orders::Longitude).double().null())
                    .col(ColumnDef::new(Orders::SpecialInstructions).text().null())
                    .col(ColumnDef::new(Orders::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(Orders::TaxAmount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::DeliveryFee).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::DiscountAmount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Orders::TotalAmount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .custom(Alias::new("order_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::order_status")),
                    )
                    .col(
                        ColumnDef::new(Orders::PaymentStatus)
                            .custom(Alias::new("order_payment_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::order_payment_status")),
                    )
                    .col(
                        ColumnDef::new(Orders::PaymentMethod)
                            .custom(Alias::new("payment_method"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Orders::PromoCodeId).big_integer().null())
                    .col(ColumnDef::new(Orders::UserRewardId).big_integer().null())
                    .col(ColumnDef::new(Orders::EstimatedDeliveryTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::ActualDeliveryTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::PaymentReference).string_len(100).null())
                    .col(ColumnDef::new(Orders::PaymentVerifiedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Orders::PointsAwarded).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user")
                            .from(Orders::Table, Orders::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_user_created")
                    .table(Orders::Table)
                    .col(Orders::UserId)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OrderItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OrderItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OrderItems::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::MenuItemId).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::ItemName).string_len(200).not_null())
                    .col(
                        ColumnDef::new(OrderItems::Quantity)
                            .integer()
                            .not_null()
                            .check(Expr::col(OrderItems::Quantity).gte(1)),
                    )
                    .col(ColumnDef::new(OrderItems::UnitPrice).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::TotalPrice).big_integer().not_null())
                    .col(ColumnDef::new(OrderItems::SpecialInstructions).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_order")
                            .from(OrderItems::Table, OrderItems::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_order_items_menu_item")
                            .from(OrderItems::Table, OrderItems::MenuItemId)
                            .to(MenuItems::Table, MenuItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_order_items_order")
                    .table(OrderItems::Table)
                    .col(OrderItems::OrderId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OrderItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
