use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "points_transaction_type"
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    #[sea_orm(string_value = "earned")]
    Earned,
    #[sea_orm(string_value = "spent")]
    Spent,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "bonus")]
    Bonus,
    #[sea_orm(string_value = "referral")]
    Referral,
    #[sea_orm(string_value = "birthday")]
    Birthday,
    #[sea_orm(string_value = "first_order")]
    FirstOrder,
    #[sea_orm(string_value = "physical_visit")]
    PhysicalVisit,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Earned => write!(f, "earned"),
            TransactionType::Spent => write!(f, "spent"),
            TransactionType::Expired => write!(f, "expired"),
            TransactionType::Bonus => write!(f, "bonus"),
            TransactionType::Referral => write!(f, "referral"),
            TransactionType::Birthday => write!(f, "birthday"),
            TransactionType::FirstOrder => write!(f, "first_order"),
            TransactionType::PhysicalVisit => write!(f, "physical_visit"),
        }
    }
}

/// Ledger entry. `amount` is signed: negative for spends and expiries.
/// `related_user_id` is the other side of a referral bonus.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "points_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub reason: String,
    pub balance_after: i64,
    pub order_id: Option<i64>,
    pub related_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
