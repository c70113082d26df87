use sea_orm_migration::prelude::*;

/// Singleton row (id = 1) holding runtime restaurant configuration.
#[derive(DeriveIden)]
enum RestaurantSettings {
    Table,
    Id,
    Name,
    Description,
    Tagline,
    Address,
    Phone,
    Email,
    Latitude,
    Longitude,
    OpeningTime,
    ClosingTime,
    OpeningHours,
    IsOpen,
    DeliveryRadiusKm,
    MinimumOrder,
    FreeDeliveryThreshold,
    VatRateBp,
    PickupFee,
    DeliveryFeeBase,
    DeliveryFeePerKm,
    AcceptsCash,
    AcceptsCard,
    AcceptsMobileMoney,
    MaintenanceMode,
    MaintenanceMessage,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Categories {
    Table,
    Id,
    Name,
    Description,
    ImageUrl,
    IsActive,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MenuItems {
    Table,
    Id,
    CategoryId,
    Name,
    Description,
    Price,
    ImageUrl,
    Badges,
    Allergens,
    NutritionalInfo,
    IsAvailable,
    IsFeatured,
    PreparationTime,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Money columns are kobo, vat_rate_bp is basis points (750 = 7.5%)
        manager
            .create_table(
                Table::create()
                    .table(RestaurantSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RestaurantSettings::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RestaurantSettings::Name).string_len(200).not_null())
                    .col(ColumnDef::new(RestaurantSettings::Description).text().not_null().default(""))
                    .col(ColumnDef::new(RestaurantSettings::Tagline).string_len(255).not_null().default(""))
                    .col(ColumnDef::new(RestaurantSettings::Address).text().not_null().default(""))
                    .col(ColumnDef::new(RestaurantSettings::Phone).string_len(32).not_null().default(""))
                    .col(ColumnDef::new(RestaurantSettings::Email).string_len(254).not_null().default(""))
                    .col(ColumnDef::new(RestaurantSettings::Latitude).double().not_null())
                    .col(ColumnDef::new(RestaurantSettings::Longitude).double().not_null())
                    .col(ColumnDef::new(RestaurantSettings::OpeningTime).time().not_null())
                    .col(ColumnDef::new(RestaurantSettings::ClosingTime).time().not_null())
                    .col(ColumnDef::new(RestaurantSettings::OpeningHours).json_binary().null())
                    .col(ColumnDef::new(RestaurantSettings::IsOpen).boolean().not_null().default(true))
                    .col(ColumnDef::new(RestaurantSettings::DeliveryRadiusKm).double().not_null())
                    .col(ColumnDef::new(RestaurantSettings::MinimumOrder).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(RestaurantSettings::FreeDeliveryThreshold)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(RestaurantSettings::VatRateBp).integer().not_null().default(0))
                    .col(ColumnDef::new(RestaurantSettings::PickupFee).big_integer().not_null().default(0))
                    .col(ColumnDef::new(RestaurantSettings::DeliveryFeeBase).big_integer().not_null().default(0))
                    .col(ColumnDef::new(RestaurantSettings::DeliveryFeePerKm).big_integer().not_null().default(0))
                    .col(ColumnDef::new(RestaurantSettings::AcceptsCash).boolean().not_null().default(true))
                    .col(ColumnDef::new(RestaurantSettings::AcceptsCard).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(RestaurantSettings::AcceptsMobileMoney)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RestaurantSettings::MaintenanceMode)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RestaurantSettings::MaintenanceMessage)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RestaurantSettings::UpdatedAt)
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
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Categories::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Categories::ImageUrl).string().null())
                    .col(ColumnDef::new(Categories::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Categories::SortOrder).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Categories::UpdatedAt)
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
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MenuItems::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MenuItems::CategoryId).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::Name).string_len(200).not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().not_null().default(""))
                    .col(ColumnDef::new(MenuItems::Price).big_integer().not_null())
                    .col(ColumnDef::new(MenuItems::ImageUrl).string().null())
                    .col(
                        ColumnDef::new(MenuItems::Badges)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(MenuItems::Allergens)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(MenuItems::NutritionalInfo).json_binary().null())
                    .col(ColumnDef::new(MenuItems::IsAvailable).boolean().not_null().default(true))
                    .col(ColumnDef::new(MenuItems::IsFeatured).boolean().not_null().default(false))
                    .col(ColumnDef::new(MenuItems::PreparationTime).integer().not_null().default(15))
                    .col(ColumnDef::new(MenuItems::SortOrder).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(MenuItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(MenuItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_menu_items_category")
                            .from(MenuItems::Table, MenuItems::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_menu_items_category")
                    .table(MenuItems::Table)
                    .col(MenuItems::CategoryId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItems::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RestaurantSettings::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
