use crate::entities::{DiscountType, promo_code_entity, promo_code_usage_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromoCodeResponse {
    pub id: i64,
    pub code: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub minimum_order_amount: i64,
    pub maximum_discount: Option<i64>,
    pub is_active: bool,
    pub usage_limit: i32,
    pub current_usage: i32,
    pub remaining_uses: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl From<promo_code_entity::Model> for PromoCodeResponse {
    fn from(p: promo_code_entity::Model) -> Self {
        let remaining_uses = p.remaining_uses();
        Self {
            id: p.id,
            code: p.code,
            description: p.description,
            discount_type: p.discount_type,
            discount_value: p.discount_value,
            minimum_order_amount: p.minimum_order_amount,
            maximum_discount: p.maximum_discount,
            is_active: p.is_active,
            usage_limit: p.usage_limit,
            current_usage: p.current_usage,
            remaining_uses,
            valid_from: p.valid_from,
            valid_until: p.valid_until,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidatePromoRequest {
    #[schema(example = "WELCOME10")]
    pub code: String,
    /// kobo
    pub order_amount: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidatePromoResponse {
    pub code: String,
    pub is_valid: bool,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyPromoRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromoUsageResponse {
    pub id: i64,
    pub promo_code_id: i64,
    pub code: String,
    pub order_id: i64,
    pub discount_amount: i64,
    pub used_at: DateTime<Utc>,
}

impl PromoUsageResponse {
    pub fn new(u: promo_code_usage_entity::Model, code: String) -> Self {
        Self {
            id: u.id,
            promo_code_id: u.promo_code_id,
            code,
            order_id: u.order_id,
            discount_amount: u.discount_amount,
            used_at: u.used_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePromoCodeRequest {
    pub code: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub minimum_order_amount: i64,
    pub maximum_discount: Option<i64>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub usage_limit: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePromoCodeRequest {
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<i64>,
    pub minimum_order_amount: Option<i64>,
    pub maximum_discount: Option<i64>,
    pub is_active: Option<bool>,
    pub usage_limit: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}
