//! Loyalty accrual and tiering rules.

use crate::config::LoyaltyConfig;
use crate::entities::VisitType;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `amount` kobo earns `points_per_unit` points for every whole Naira.
pub fn points_for_amount(amount: i64, points_per_unit: i64) -> i64 {
    if amount <= 0 {
        return 0;
    }
    amount / 100 * points_per_unit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OrderPoints {
    pub base_points: i64,
    pub first_order_bonus: i64,
    pub birthday_bonus: i64,
    pub total_points: i64,
}

pub fn order_points(
    subtotal: i64,
    is_first_order: bool,
    is_birthday: bool,
    cfg: &LoyaltyConfig,
) -> OrderPoints {
    let base_points = points_for_amount(subtotal, cfg.points_per_unit);
    let first_order_bonus = if is_first_order { cfg.first_order_bonus } else { 0 };
    let birthday_bonus = if is_birthday { cfg.birthday_bonus } else { 0 };
    OrderPoints {
        base_points,
        first_order_bonus,
        birthday_bonus,
        total_points: base_points + first_order_bonus + birthday_bonus,
    }
}

pub fn visit_type_bonus(visit_type: &VisitType, cfg: &LoyaltyConfig) -> i64 {
    match visit_type {
        VisitType::General => 0,
        VisitType::Lunch => cfg.lunch_visit_bonus,
        VisitType::Dinner => cfg.dinner_visit_bonus,
        VisitType::HappyHour => cfg.happy_hour_visit_bonus,
    }
}

/// Points for an in-store visit recorded by a card scan
pub fn visit_points(visit_type: &VisitType, visit_amount: i64, cfg: &LoyaltyConfig) -> i64 {
    cfg.physical_visit_points
        + visit_type_bonus(visit_type, cfg)
        + points_for_amount(visit_amount, cfg.points_per_unit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TierBenefits {
    pub name: String,
    pub points_multiplier: f64,
    /// kobo
    pub free_delivery_threshold: i64,
    pub special_offers: bool,
}

impl LoyaltyTier {
    pub fn for_total_earned(total_earned: i64, cfg: &LoyaltyConfig) -> Self {
        if total_earned >= cfg.platinum_threshold {
            LoyaltyTier::Platinum
        } else if total_earned >= cfg.gold_threshold {
            LoyaltyTier::Gold
        } else if total_earned >= cfg.silver_threshold {
            LoyaltyTier::Silver
        } else {
            LoyaltyTier::Bronze
        }
    }

    /// Next tier and the lifetime points needed to reach it
    pub fn next(&self, cfg: &LoyaltyConfig) -> Option<(LoyaltyTier, i64)> {
        match self {
            LoyaltyTier::Bronze => Some((LoyaltyTier::Silver, cfg.silver_threshold)),
            LoyaltyTier::Silver => Some((LoyaltyTier::Gold, cfg.gold_threshold)),
            LoyaltyTier::Gold => Some((LoyaltyTier::Platinum, cfg.platinum_threshold)),
            LoyaltyTier::Platinum => None,
        }
    }

    pub fn benefits(&self) -> TierBenefits {
        let (name, points_multiplier, free_delivery_threshold, special_offers) = match self {
            LoyaltyTier::Bronze => ("Bronze", 1.0, 5_000, false),
            LoyaltyTier::Silver => ("Silver", 1.1, 3_000, true),
            LoyaltyTier::Gold => ("Gold", 1.2, 2_000, true),
            LoyaltyTier::Platinum => ("Platinum", 1.5, 0, true),
        };
        TierBenefits {
            name: name.to_string(),
            points_multiplier,
            free_delivery_threshold,
            special_offers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_for_amount_whole_units_only() {
        assert_eq!(points_for_amount(12_345, 1), 123);
        assert_eq!(points_for_amount(99, 1), 0);
        assert_eq!(points_for_amount(10_000, 10), 1_000);
        assert_eq!(points_for_amount(-500, 1), 0);
    }

    #[test]
    fn test_order_points_bonuses() {
        let cfg = LoyaltyConfig::default();
        let plain = order_points(500_000, false, false, &cfg);
        assert_eq!(plain.total_points, 5_000);

        let both = order_points(500_000, true, true, &cfg);
        assert_eq!(both.first_order_bonus, 1_000);
        assert_eq!(both.birthday_bonus, 5_000);
        assert_eq!(both.total_points, 11_000);
    }

    #[test]
    fn test_visit_points() {
        let cfg = LoyaltyConfig::default();
        assert_eq!(visit_points(&VisitType::General, 0, &cfg), 500);
        assert_eq!(visit_points(&VisitType::Lunch, 0, &cfg), 525);
        assert_eq!(visit_points(&VisitType::HappyHour, 250_000, &cfg), 500 + 30 + 2_500);
    }

    #[test]
    fn test_tiers() {
        let cfg = LoyaltyConfig::default();
        assert_eq!(LoyaltyTier::for_total_earned(0, &cfg), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::for_total_earned(49_999, &cfg), LoyaltyTier::Bronze);
        assert_eq!(LoyaltyTier::for_total_earned(50_000, &cfg), LoyaltyTier::Silver);
        assert_eq!(LoyaltyTier::for_total_earned(100_000, &cfg), LoyaltyTier::Gold);
        assert_eq!(LoyaltyTier::for_total_earned(250_000, &cfg), LoyaltyTier::Platinum);
        assert_eq!(LoyaltyTier::Platinum.next(&cfg), None);
        assert_eq!(
            LoyaltyTier::Silver.next(&cfg),
            Some((LoyaltyTier::Gold, 100_000))
        );
        assert_eq!(LoyaltyTier::Gold.benefits().points_multiplier, 1.2);
        assert!(!LoyaltyTier::Bronze.benefits().special_offers);
    }
}
