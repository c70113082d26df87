use crate::utils::pricing::DeliveryPricing;
use chrono::{DateTime, NaiveTime, Utc};
use sea_orm::entity::prelude::*;

/// The settings table holds exactly one row with this id.
pub const SETTINGS_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "restaurant_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub latitude: f64,
    pub longitude: f64,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub opening_hours: Option<Json>,
    pub is_open: bool,
    pub delivery_radius_km: f64,
    pub minimum_order: i64,
    pub free_delivery_threshold: i64,
    pub vat_rate_bp: i32,
    pub pickup_fee: i64,
    pub delivery_fee_base: i64,
    pub delivery_fee_per_km: i64,
    pub accepts_cash: bool,
    pub accepts_card: bool,
    pub accepts_mobile_money: bool,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn delivery_pricing(&self) -> DeliveryPricing {
        DeliveryPricing {
            origin_lat: self.latitude,
            origin_lng: self.longitude,
            radius_km: self.delivery_radius_km,
            base_fee: self.delivery_fee_base,
            per_km_fee: self.delivery_fee_per_km,
            pickup_fee: self.pickup_fee,
            free_delivery_threshold: self.free_delivery_threshold,
        }
    }

    /// Whether orders are accepted at `time` given the flags and the daily window.
    /// A closing time earlier than the opening time wraps past midnight.
    pub fn is_accepting_orders_at(&self, time: NaiveTime) -> bool {
        if !self.is_open || self.maintenance_mode {
            return false;
        }
        if self.opening_time <= self.closing_time {
            time >= self.opening_time && time < self.closing_time
        } else {
            time >= self.opening_time || time < self.closing_time
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
