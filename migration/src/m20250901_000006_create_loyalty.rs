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

#[derive(DeriveIden)]
enum UserPoints {
    Table,
    Id,
    UserId,
    Balance,
    TotalEarned,
    TotalSpent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointsTransactions {
    Table,
    Id,
    UserId,
    Amount,
    TransactionType,
    Reason,
    BalanceAfter,
    OrderId,
    RelatedUserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Rewards {
    Table,
    Id,
    Name,
    Description,
    RewardType,
    PointsRequired,
    DiscountPercentageBp,
    DiscountAmount,
    FreeItemId,
    IsActive,
    MaxRedemptions,
    CurrentRedemptions,
    ValidFrom,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserRewards {
    Table,
    Id,
    UserId,
    RewardId,
    PointsSpent,
    Status,
    RedeemedAt,
    UsedAt,
    ExpiresAt,
    OrderId,
}

#[derive(DeriveIden)]
enum LoyaltyCards {
    Table,
    Id,
    QrCode,
    UserId,
    IsActive,
    LastScan,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CardScans {
    Table,
    Id,
    CardId,
    UserId,
    VisitType,
    VisitAmount,
    PointsAwarded,
    ScannedBy,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPoints::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserPoints::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserPoints::Balance)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(UserPoints::Balance).gte(0)),
                    )
                    .col(ColumnDef::new(UserPoints::TotalEarned).big_integer().not_null().default(0))
                    .col(ColumnDef::new(UserPoints::TotalSpent).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(UserPoints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(UserPoints::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_points_user")
                            .from(UserPoints::Table, UserPoints::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PointsTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointsTransactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PointsTransactions::UserId).big_integer().not_null())
                    .col(ColumnDef::new(PointsTransactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(PointsTransactions::TransactionType)
                            .custom(Alias::new("points_transaction_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointsTransactions::Reason).string_len(255).not_null())
                    .col(ColumnDef::new(PointsTransactions::BalanceAfter).big_integer().not_null())
                    .col(ColumnDef::new(PointsTransactions::OrderId).big_integer().null())
                    .col(ColumnDef::new(PointsTransactions::RelatedUserId).big_integer().null())
                    .col(
                        ColumnDef::new(PointsTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_transactions_user")
                            .from(PointsTransactions::Table, PointsTransactions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_transactions_order")
                            .from(PointsTransactions::Table, PointsTransactions::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_points_transactions_related_user")
                            .from(PointsTransactions::Table, PointsTransactions::RelatedUserId)
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
                    .name("idx_points_transactions_user_created")
                    .table(PointsTransactions::Table)
                    .col(PointsTransactions::UserId)
                    .col(PointsTransactions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rewards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rewards::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Rewards::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Rewards::RewardType)
                            .custom(Alias::new("reward_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rewards::PointsRequired).big_integer().not_null())
                    .col(ColumnDef::new(Rewards::DiscountPercentageBp).integer().null())
                    .col(ColumnDef::new(Rewards::DiscountAmount).big_integer().null())
                    .col(ColumnDef::new(Rewards::FreeItemId).big_integer().null())
                    .col(ColumnDef::new(Rewards::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Rewards::MaxRedemptions).integer().not_null().default(0))
                    .col(ColumnDef::new(Rewards::CurrentRedemptions).integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Rewards::ValidFrom)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(ColumnDef::new(Rewards::ValidUntil).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(Rewards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Rewards::UpdatedAt)
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
                    .table(UserRewards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRewards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRewards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(UserRewards::RewardId).big_integer().not_null())
                    .col(ColumnDef::new(UserRewards::PointsSpent).big_integer().not_null())
                    .col(
                        ColumnDef::new(UserRewards::Status)
                            .custom(Alias::new("user_reward_status"))
                            .not_null()
                            .default(Expr::cust("'active'::user_reward_status")),
                    )
                    .col(
                        ColumnDef::new(UserRewards::RedeemedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(ColumnDef::new(UserRewards::UsedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(UserRewards::ExpiresAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(UserRewards::OrderId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_rewards_user")
                            .from(UserRewards::Table, UserRewards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_rewards_reward")
                            .from(UserRewards::Table, UserRewards::RewardId)
                            .to(Rewards::Table, Rewards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_rewards_order")
                            .from(UserRewards::Table, UserRewards::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_rewards_user_status")
                    .table(UserRewards::Table)
                    .col(UserRewards::UserId)
                    .col(UserRewards::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LoyaltyCards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LoyaltyCards::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyCards::QrCode)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(LoyaltyCards::UserId)
                            .big_integer()
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LoyaltyCards::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(LoyaltyCards::LastScan).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(LoyaltyCards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(LoyaltyCards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_loyalty_cards_user")
                            .from(LoyaltyCards::Table, LoyaltyCards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CardScans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardScans::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CardScans::CardId).big_integer().not_null())
                    .col(ColumnDef::new(CardScans::UserId).big_integer().null())
                    .col(
                        ColumnDef::new(CardScans::VisitType)
                            .custom(Alias::new("visit_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(CardScans::VisitAmount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(CardScans::PointsAwarded).big_integer().not_null().default(0))
                    .col(ColumnDef::new(CardScans::ScannedBy).big_integer().null())
                    .col(
                        ColumnDef::new(CardScans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_scans_card")
                            .from(CardScans::Table, CardScans::CardId)
                            .to(LoyaltyCards::Table, LoyaltyCards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_card_scans_created")
                    .table(CardScans::Table)
                    .col(CardScans::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CardScans::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LoyaltyCards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRewards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rewards::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointsTransactions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserPoints::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
