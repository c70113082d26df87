use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (type name, values) for every Postgres ENUM used by the schema.
const ENUM_TYPES: &[(&str, &[&str])] = &[
    ("social_provider", &["google", "facebook", "apple"]),
    ("address_type", &["home", "work", "other"]),
    (
        "order_status",
        &[
            "pending",
            "confirmed",
            "preparing",
            "ready",
            "out_for_delivery",
            "delivered",
            "cancelled",
            "refunded",
        ],
    ),
    ("order_payment_status", &["pending", "paid", "failed", "refunded"]),
    ("delivery_type", &["delivery", "pickup"]),
    ("payment_method", &["cash", "online"]),
    (
        "gateway_payment_status",
        &["pending", "success", "failed", "abandoned"],
    ),
    (
        "points_transaction_type",
        &[
            "earned",
            "spent",
            "expired",
            "bonus",
            "referral",
            "birthday",
            "first_order",
            "physical_visit",
        ],
    ),
    (
        "reward_type",
        &["discount", "free_item", "free_delivery", "cashback"],
    ),
    ("user_reward_status", &["active", "used", "expired"]),
    ("visit_type", &["general", "lunch", "dinner", "happy_hour"]),
    ("discount_type", &["percentage", "fixed"]),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, values) in ENUM_TYPES {
            manager
                .create_type(
                    Type::create()
                        .as_enum(Alias::new(*name))
                        .values(values.iter().map(|v| Alias::new(*v)))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, _) in ENUM_TYPES.iter().rev() {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(*name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
