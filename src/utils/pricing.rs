//! Order money math. All amounts are kobo, rates are basis points.

use crate::entities::DeliveryType;
use crate::error::{AppError, AppResult};
use crate::utils::geo::{haversine_km, round_km};
use serde::Serialize;
use utoipa::ToSchema;

/// Fee table and delivery zone, usually built from the restaurant settings row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryPricing {
    pub origin_lat: f64,
    pub origin_lng: f64,
    pub radius_km: f64,
    pub base_fee: i64,
    pub per_km_fee: i64,
    pub pickup_fee: i64,
    /// 0 disables free delivery
    pub free_delivery_threshold: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DeliveryQuote {
    pub delivery_fee: i64,
    pub distance_km: Option<f64>,
    pub free_delivery_applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub tax_amount: i64,
    pub delivery_fee: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
}

impl DeliveryPricing {
    pub fn distance_from_origin(&self, lat: f64, lng: f64) -> f64 {
        haversine_km(self.origin_lat, self.origin_lng, lat, lng)
    }

    pub fn within_zone(&self, lat: f64, lng: f64) -> bool {
        self.distance_from_origin(lat, lng) <= self.radius_km
    }

    pub fn qualifies_for_free_delivery(&self, subtotal: i64) -> bool {
        self.free_delivery_threshold > 0 && subtotal >= self.free_delivery_threshold
    }

    /// Delivery fee for an order.
    ///
    /// Coordinates outside the delivery radius are rejected even when the
    /// order would qualify for free delivery.
    pub fn quote(
        &self,
        delivery_type: &DeliveryType,
        subtotal: i64,
        coordinates: Option<(f64, f64)>,
    ) -> AppResult<DeliveryQuote> {
        let distance_km = match (delivery_type, coordinates) {
            (DeliveryType::Delivery, Some((lat, lng))) => {
                let distance = self.distance_from_origin(lat, lng);
                if distance > self.radius_km {
                    return Err(AppError::field(
                        "delivery_address",
                        format!(
                            "Address is {:.1} km away, outside our {:.1} km delivery zone",
                            distance, self.radius_km
                        ),
                    ));
                }
                Some(distance)
            }
            _ => None,
        };

        if self.qualifies_for_free_delivery(subtotal) {
            return Ok(DeliveryQuote {
                delivery_fee: 0,
                distance_km: distance_km.map(round_km),
                free_delivery_applied: true,
            });
        }

        let fee = match (delivery_type, distance_km) {
            (DeliveryType::Pickup, _) => self.pickup_fee,
            (DeliveryType::Delivery, None) => self.base_fee,
            (DeliveryType::Delivery, Some(km)) => {
                self.base_fee + (self.per_km_fee as f64 * km).round() as i64
            }
        };

        Ok(DeliveryQuote {
            delivery_fee: fee.max(0),
            distance_km: distance_km.map(round_km),
            free_delivery_applied: false,
        })
    }
}

/// VAT on the subtotal, rounded half-up to the nearest kobo.
pub fn vat_amount(subtotal: i64, vat_rate_bp: i32) -> i64 {
    (subtotal * vat_rate_bp as i64 + 5_000) / 10_000
}

/// Assemble order totals. The discount is capped so the total never goes negative.
pub fn compute_totals(subtotal: i64, tax_amount: i64, delivery_fee: i64, discount: i64) -> OrderTotals {
    let gross = subtotal + tax_amount + delivery_fee;
    let discount_amount = discount.clamp(0, gross);
    OrderTotals {
        subtotal,
        tax_amount,
        delivery_fee,
        discount_amount,
        total_amount: gross - discount_amount,
    }
}

/// Sum of `unit_price * quantity` across lines
pub fn line_subtotal<I>(lines: I) -> i64
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .map(|(unit_price, quantity)| unit_price * quantity as i64)
        .sum()
}

/// Minutes until the order is expected at the customer.
pub fn estimated_minutes(item_count: i64, delivery_type: &DeliveryType) -> i64 {
    let mut minutes = 20;
    if item_count > 5 {
        minutes += 10;
    }
    if *delivery_type == DeliveryType::Delivery {
        minutes += 15;
    }
    minutes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abuja() -> DeliveryPricing {
        DeliveryPricing {
            origin_lat: 9.0820,
            origin_lng: 7.3986,
            radius_km: 10.0,
            base_fee: 200_000,
            per_km_fee: 15_000,
            pickup_fee: 0,
            free_delivery_threshold: 2_000_000,
        }
    }

    #[test]
    fn test_pickup_uses_pickup_fee() {
        let mut p = abuja();
        p.pickup_fee = 5_000;
        let q = p.quote(&DeliveryType::Pickup, 100_000, None).unwrap();
        assert_eq!(q.delivery_fee, 5_000);
        assert_eq!(q.distance_km, None);
    }

    #[test]
    fn test_delivery_without_coordinates_is_base_fee() {
        let q = abuja().quote(&DeliveryType::Delivery, 100_000, None).unwrap();
        assert_eq!(q.delivery_fee, 200_000);
    }

    #[test]
    fn test_delivery_fee_scales_with_distance() {
        // one hundredth of a degree north is about 1.11 km
        let q = abuja()
            .quote(&DeliveryType::Delivery, 100_000, Some((9.0920, 7.3986)))
            .unwrap();
        let km = haversine_km(9.0820, 7.3986, 9.0920, 7.3986);
        assert_eq!(q.delivery_fee, 200_000 + (15_000.0 * km).round() as i64);
        assert!(!q.free_delivery_applied);
    }

    #[test]
    fn test_outside_zone_rejected() {
        // Lagos is far outside a 10 km radius around Abuja
        let err = abuja()
            .quote(&DeliveryType::Delivery, 100_000, Some((6.5244, 3.3792)))
            .unwrap_err();
        assert!(matches!(err, AppError::FieldErrors(_)));
    }

    #[test]
    fn test_free_delivery_at_threshold() {
        let p = abuja();
        for subtotal in [2_000_000, 2_000_001, 9_000_000] {
            let q = p
                .quote(&DeliveryType::Delivery, subtotal, Some((9.0920, 7.3986)))
                .unwrap();
            assert_eq!(q.delivery_fee, 0);
            assert!(q.free_delivery_applied);
        }
        let below = p.quote(&DeliveryType::Delivery, 1_999_999, None).unwrap();
        assert_eq!(below.delivery_fee, 200_000);
    }

    #[test]
    fn test_zero_threshold_disables_free_delivery() {
        let mut p = abuja();
        p.free_delivery_threshold = 0;
        let q = p.quote(&DeliveryType::Delivery, 50_000_000, None).unwrap();
        assert_eq!(q.delivery_fee, 200_000);
    }

    #[test]
    fn test_vat_rounding() {
        assert_eq!(vat_amount(1_000_000, 750), 75_000);
        assert_eq!(vat_amount(1_999, 750), 150); // 149.925 rounds up
        assert_eq!(vat_amount(1_000, 0), 0);
    }

    #[test]
    fn test_total_identity() {
        let lines = [(250_000, 2), (120_000, 1)];
        let subtotal = line_subtotal(lines);
        assert_eq!(subtotal, 620_000);
        let tax = vat_amount(subtotal, 750);
        let totals = compute_totals(subtotal, tax, 200_000, 50_000);
        assert_eq!(
            totals.total_amount,
            totals.subtotal + totals.tax_amount + totals.delivery_fee - totals.discount_amount
        );
        assert_eq!(totals.total_amount, 620_000 + 46_500 + 200_000 - 50_000);
    }

    #[test]
    fn test_discount_capped_at_gross() {
        let totals = compute_totals(10_000, 750, 0, 1_000_000);
        assert_eq!(totals.discount_amount, 10_750);
        assert_eq!(totals.total_amount, 0);
    }

    #[test]
    fn test_estimated_minutes() {
        assert_eq!(estimated_minutes(1, &DeliveryType::Pickup), 20);
        assert_eq!(estimated_minutes(6, &DeliveryType::Pickup), 30);
        assert_eq!(estimated_minutes(6, &DeliveryType::Delivery), 45);
    }
}
