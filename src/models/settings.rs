use crate::entities::settings_entity;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Public subset of the restaurant settings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RestaurantInfo {
    pub name: String,
    pub description: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    #[schema(value_type = String, example = "10:00:00")]
    pub opening_time: NaiveTime,
    #[schema(value_type = String, example = "22:00:00")]
    pub closing_time: NaiveTime,
    #[schema(value_type = Option<Object>)]
    pub opening_hours: Option<Value>,
    pub is_open: bool,
    pub is_accepting_orders: bool,
    pub delivery_radius_km: f64,
    pub minimum_order: i64,
    pub free_delivery_threshold: i64,
    pub vat_rate_bp: i32,
    pub accepts_cash: bool,
    pub accepts_card: bool,
    pub accepts_mobile_money: bool,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
}

impl RestaurantInfo {
    pub fn from_model(s: settings_entity::Model, now: NaiveTime) -> Self {
        let is_accepting_orders = s.is_accepting_orders_at(now);
        Self {
            name: s.name,
            description: s.description,
            tagline: s.tagline,
            address: s.address,
            phone: s.phone,
            email: s.email,
            latitude: s.latitude,
            longitude: s.longitude,
            opening_time: s.opening_time,
            closing_time: s.closing_time,
            opening_hours: s.opening_hours,
            is_open: s.is_open,
            is_accepting_orders,
            delivery_radius_km: s.delivery_radius_km,
            minimum_order: s.minimum_order,
            free_delivery_threshold: s.free_delivery_threshold,
            vat_rate_bp: s.vat_rate_bp,
            accepts_cash: s.accepts_cash,
            accepts_card: s.accepts_card,
            accepts_mobile_money: s.accepts_mobile_money,
            maintenance_mode: s.maintenance_mode,
            maintenance_message: s.maintenance_message,
        }
    }
}

/// Full settings row, including the fee table
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub info: RestaurantInfo,
    pub pickup_fee: i64,
    pub delivery_fee_base: i64,
    pub delivery_fee_per_km: i64,
    pub updated_at: DateTime<Utc>,
}

impl SettingsResponse {
    pub fn from_model(s: settings_entity::Model, now: NaiveTime) -> Self {
        let pickup_fee = s.pickup_fee;
        let delivery_fee_base = s.delivery_fee_base;
        let delivery_fee_per_km = s.delivery_fee_per_km;
        let updated_at = s.updated_at;
        Self {
            info: RestaurantInfo::from_model(s, now),
            pickup_fee,
            delivery_fee_base,
            delivery_fee_per_km,
            updated_at,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub tagline: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[schema(value_type = Option<String>, example = "10:00:00")]
    pub opening_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "22:00:00")]
    pub closing_time: Option<NaiveTime>,
    #[schema(value_type = Option<Object>)]
    pub opening_hours: Option<Value>,
    pub is_open: Option<bool>,
    pub delivery_radius_km: Option<f64>,
    pub minimum_order: Option<i64>,
    pub free_delivery_threshold: Option<i64>,
    pub vat_rate_bp: Option<i32>,
    pub pickup_fee: Option<i64>,
    pub delivery_fee_base: Option<i64>,
    pub delivery_fee_per_km: Option<i64>,
    pub accepts_cash: Option<bool>,
    pub accepts_card: Option<bool>,
    pub accepts_mobile_money: Option<bool>,
    pub maintenance_mode: Option<bool>,
    pub maintenance_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub database: bool,
    pub is_open: bool,
    pub is_accepting_orders: bool,
    pub maintenance_mode: bool,
    pub maintenance_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryZoneRequest {
    #[schema(example = 9.0765)]
    pub latitude: f64,
    #[schema(example = 7.4893)]
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryZoneResponse {
    pub within_zone: bool,
    pub distance_km: f64,
    pub delivery_radius_km: f64,
    /// Fee for a delivery to this point before any free-delivery threshold
    pub delivery_fee: Option<i64>,
}
