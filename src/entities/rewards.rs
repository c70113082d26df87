use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reward_type")]
#[serde(rename_all = "snake_case")]
pub enum RewardType {
    #[sea_orm(string_value = "discount")]
    Discount,
    #[sea_orm(string_value = "free_item")]
    FreeItem,
    #[sea_orm(string_value = "free_delivery")]
    FreeDelivery,
    #[sea_orm(string_value = "cashback")]
    Cashback,
}

impl std::fmt::Display for RewardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RewardType::Discount => write!(f, "discount"),
            RewardType::FreeItem => write!(f, "free_item"),
            RewardType::FreeDelivery => write!(f, "free_delivery"),
            RewardType::Cashback => write!(f, "cashback"),
        }
    }
}

/// Catalog entry redeemable for points
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "rewards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: String,
    pub reward_type: RewardType,
    pub points_required: i64,
    /// Percentage discount in basis points (1000 = 10%)
    pub discount_percentage_bp: Option<i32>,
    /// Fixed discount or cashback in kobo
    pub discount_amount: Option<i64>,
    pub free_item_id: Option<i64>,
    pub is_active: bool,
    /// 0 = unlimited
    pub max_redemptions: i32,
    pub current_redemptions: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= now
            && self.valid_until.is_none_or(|until| until > now)
            && (self.max_redemptions == 0 || self.current_redemptions < self.max_redemptions)
    }

    /// Amount this reward takes off an order with the given subtotal and delivery fee.
    pub fn discount_for(&self, subtotal: i64, delivery_fee: i64) -> i64 {
        match self.reward_type {
            RewardType::Discount => match (self.discount_percentage_bp, self.discount_amount) {
                (Some(bp), _) if bp > 0 => subtotal * bp as i64 / 10_000,
                (_, Some(amount)) => amount,
                _ => 0,
            },
            RewardType::FreeDelivery => delivery_fee,
            RewardType::Cashback => self.discount_amount.unwrap_or(0),
            RewardType::FreeItem => 0,
        }
        .max(0)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reward(reward_type: RewardType) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            name: "Ten off".into(),
            description: String::new(),
            reward_type,
            points_required: 500,
            discount_percentage_bp: None,
            discount_amount: None,
            free_item_id: None,
            is_active: true,
            max_redemptions: 0,
            current_redemptions: 0,
            valid_from: now - Duration::days(1),
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_availability_window_and_limit() {
        let now = Utc::now();
        let mut r = reward(RewardType::Discount);
        assert!(r.is_available_at(now));

        r.valid_until = Some(now - Duration::minutes(1));
        assert!(!r.is_available_at(now));

        r.valid_until = Some(now + Duration::days(1));
        r.valid_from = now + Duration::hours(1);
        assert!(!r.is_available_at(now));

        r.valid_from = now - Duration::hours(1);
        r.max_redemptions = 3;
        r.current_redemptions = 3;
        assert!(!r.is_available_at(now));
        r.current_redemptions = 2;
        assert!(r.is_available_at(now));

        r.is_active = false;
        assert!(!r.is_available_at(now));
    }

    #[test]
    fn test_discount_by_type() {
        let mut pct = reward(RewardType::Discount);
        pct.discount_percentage_bp = Some(1_000);
        assert_eq!(pct.discount_for(500_000, 200_000), 50_000);

        let mut fixed = reward(RewardType::Discount);
        fixed.discount_amount = Some(30_000);
        assert_eq!(fixed.discount_for(500_000, 200_000), 30_000);

        assert_eq!(
            reward(RewardType::FreeDelivery).discount_for(500_000, 200_000),
            200_000
        );

        let mut cashback = reward(RewardType::Cashback);
        cashback.discount_amount = Some(10_000);
        assert_eq!(cashback.discount_for(500_000, 0), 10_000);

        assert_eq!(reward(RewardType::FreeItem).discount_for(500_000, 0), 0);
    }
}
