use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_type")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percentage => write!(f, "percentage"),
            DiscountType::Fixed => write!(f, "fixed"),
        }
    }
}

/// Why a promo code cannot be used right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoRejection {
    Inactive,
    NotStarted,
    Expired,
    UsageLimitReached,
}

impl std::fmt::Display for PromoRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromoRejection::Inactive => write!(f, "Promo code is not active"),
            PromoRejection::NotStarted => write!(f, "Promo code is not yet valid"),
            PromoRejection::Expired => write!(f, "Promo code has expired"),
            PromoRejection::UsageLimitReached => write!(f, "Promo code usage limit reached"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    /// basis points for percentage codes, kobo for fixed codes
    pub discount_value: i64,
    pub minimum_order_amount: i64,
    pub maximum_discount: Option<i64>,
    pub is_active: bool,
    /// 0 = unlimited
    pub usage_limit: i32,
    pub current_usage: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn check_valid_at(&self, now: DateTime<Utc>) -> Result<(), PromoRejection> {
        if !self.is_active {
            return Err(PromoRejection::Inactive);
        }
        if now < self.valid_from {
            return Err(PromoRejection::NotStarted);
        }
        if now > self.valid_until {
            return Err(PromoRejection::Expired);
        }
        if self.usage_limit > 0 && self.current_usage >= self.usage_limit {
            return Err(PromoRejection::UsageLimitReached);
        }
        Ok(())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.check_valid_at(now).is_ok()
    }

    /// Discount on `order_amount`, capped by `maximum_discount` and the amount itself.
    pub fn calculate_discount(&self, order_amount: i64) -> i64 {
        if order_amount <= 0 || order_amount < self.minimum_order_amount {
            return 0;
        }
        let raw = match self.discount_type {
            DiscountType::Percentage => order_amount * self.discount_value / 10_000,
            DiscountType::Fixed => self.discount_value,
        };
        let capped = match self.maximum_discount {
            Some(max) if max > 0 => raw.min(max),
            _ => raw,
        };
        capped.clamp(0, order_amount)
    }

    pub fn remaining_uses(&self) -> Option<i32> {
        (self.usage_limit > 0).then(|| (self.usage_limit - self.current_usage).max(0))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn promo(discount_type: DiscountType, value: i64) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            code: "WELCOME10".into(),
            description: String::new(),
            discount_type,
            discount_value: value,
            minimum_order_amount: 0,
            maximum_discount: None,
            is_active: true,
            usage_limit: 0,
            current_usage: 0,
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut p = promo(DiscountType::Fixed, 1_000);
        assert!(p.is_valid_at(now));
        assert_eq!(
            p.check_valid_at(now + Duration::days(2)),
            Err(PromoRejection::Expired)
        );
        assert_eq!(
            p.check_valid_at(now - Duration::days(2)),
            Err(PromoRejection::NotStarted)
        );
        p.is_active = false;
        assert_eq!(p.check_valid_at(now), Err(PromoRejection::Inactive));
    }

    #[test]
    fn test_usage_limit() {
        let now = Utc::now();
        let mut p = promo(DiscountType::Fixed, 1_000);
        p.usage_limit = 2;
        p.current_usage = 1;
        assert!(p.is_valid_at(now));
        assert_eq!(p.remaining_uses(), Some(1));
        p.current_usage = 2;
        assert_eq!(p.check_valid_at(now), Err(PromoRejection::UsageLimitReached));
        p.usage_limit = 0;
        assert!(p.is_valid_at(now));
        assert_eq!(p.remaining_uses(), None);
    }

    #[test]
    fn test_percentage_discount_with_cap() {
        let mut p = promo(DiscountType::Percentage, 1_000); // 10%
        assert_eq!(p.calculate_discount(500_000), 50_000);
        p.maximum_discount = Some(20_000);
        assert_eq!(p.calculate_discount(500_000), 20_000);
    }

    #[test]
    fn test_minimum_order_and_amount_cap() {
        let mut p = promo(DiscountType::Fixed, 300_000);
        p.minimum_order_amount = 100_000;
        assert_eq!(p.calculate_discount(99_999), 0);
        assert_eq!(p.calculate_discount(150_000), 150_000);
        assert_eq!(p.calculate_discount(1_000_000), 300_000);
    }
}
