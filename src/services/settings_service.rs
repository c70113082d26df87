use crate::database::DbPool;
use crate::entities::settings_entity::{self as rs, SETTINGS_ID};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::ValidationErrors;
use crate::utils::geo::{round_km, within_nigeria};
use chrono::{Local, NaiveTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Set,
};

#[derive(Clone)]
pub struct SettingsService {
    pool: DbPool,
}

fn default_settings() -> rs::ActiveModel {
    rs::ActiveModel {
        id: Set(SETTINGS_ID),
        name: Set("Chopsticks and Bowls".to_string()),
        description: Set("Authentic Korean Cuisine in Abuja".to_string()),
        tagline: Set("Authentic Korean Cuisine in Abuja".to_string()),
        address: Set("Abuja, Nigeria".to_string()),
        phone: Set("+234".to_string()),
        email: Set("info@chopsticksandbowls.com".to_string()),
        latitude: Set(9.0820),
        longitude: Set(7.3986),
        opening_time: Set(NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()),
        closing_time: Set(NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default()),
        delivery_radius_km: Set(10.0),
        minimum_order: Set(0),
        free_delivery_threshold: Set(2_000_000),
        vat_rate_bp: Set(750),
        pickup_fee: Set(0),
        delivery_fee_base: Set(200_000),
        delivery_fee_per_km: Set(15_000),
        accepts_mobile_money: Set(true),
        ..Default::default()
    }
}

/// Load the settings row, creating it with defaults on first use.
pub async fn load_settings<C: ConnectionTrait>(db: &C) -> AppResult<rs::Model> {
    if let Some(s) = rs::Entity::find_by_id(SETTINGS_ID).one(db).await? {
        return Ok(s);
    }
    rs::Entity::insert(default_settings())
        .on_conflict(OnConflict::column(rs::Column::Id).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    log::info!("Restaurant settings initialized with defaults");
    rs::Entity::find_by_id(SETTINGS_ID)
        .one(db)
        .await?
        .ok_or_else(|| AppError::InternalError("Restaurant settings missing".into()))
}

/// Local wall-clock time used for opening-hours checks
pub fn local_time_now() -> NaiveTime {
    Local::now().time()
}

pub fn validate_settings_update(req: &UpdateSettingsRequest, current: &rs::Model) -> AppResult<()> {
    let mut errors = ValidationErrors::new();
    let lat = req.latitude.unwrap_or(current.latitude);
    let lng = req.longitude.unwrap_or(current.longitude);
    if !within_nigeria(lat, lng) {
        if req.latitude.is_some() {
            errors.add("latitude", "Latitude must be within Nigeria (4 to 14)");
        }
        if req.longitude.is_some() {
            errors.add("longitude", "Longitude must be within Nigeria (2 to 15)");
        }
    }
    if let Some(r) = req.delivery_radius_km {
        errors.check(r > 0.0, "delivery_radius_km", "Delivery radius must be positive");
    }
    if let Some(v) = req.vat_rate_bp {
        errors.check(
            (0..=10_000).contains(&v),
            "vat_rate_bp",
            "VAT rate must be between 0 and 10000 basis points",
        );
    }
    for (field, value) in [
        ("minimum_order", req.minimum_order),
        ("free_delivery_threshold", req.free_delivery_threshold),
        ("pickup_fee", req.pickup_fee),
        ("delivery_fee_base", req.delivery_fee_base),
        ("delivery_fee_per_km", req.delivery_fee_per_km),
    ] {
        if let Some(v) = value {
            errors.check(v >= 0, field, "Amount cannot be negative");
        }
    }
    if let Some(name) = &req.name {
        errors.check(!name.trim().is_empty(), "name", "Name cannot be empty");
    }
    errors.into_result()
}

impl SettingsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self) -> AppResult<rs::Model> {
        load_settings(self.pool.as_ref()).await
    }

    pub async fn info(&self) -> AppResult<RestaurantInfo> {
        let s = self.get().await?;
        Ok(RestaurantInfo::from_model(s, local_time_now()))
    }

    pub async fn settings(&self) -> AppResult<SettingsResponse> {
        let s = self.get().await?;
        Ok(SettingsResponse::from_model(s, local_time_now()))
    }

    pub async fn update(&self, req: UpdateSettingsRequest) -> AppResult<SettingsResponse> {
        let current = self.get().await?;
        validate_settings_update(&req, &current)?;

        let mut am = current.into_active_model();
        if let Some(v) = req.name {
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.tagline {
            am.tagline = Set(v);
        }
        if let Some(v) = req.address {
            am.address = Set(v);
        }
        if let Some(v) = req.phone {
            am.phone = Set(v);
        }
        if let Some(v) = req.email {
            am.email = Set(v);
        }
        if let Some(v) = req.latitude {
            am.latitude = Set(v);
        }
        if let Some(v) = req.longitude {
            am.longitude = Set(v);
        }
        if let Some(v) = req.opening_time {
            am.opening_time = Set(v);
        }
        if let Some(v) = req.closing_time {
            am.closing_time = Set(v);
        }
        if let Some(v) = req.opening_hours {
            am.opening_hours = Set(Some(v));
        }
        if let Some(v) = req.is_open {
            am.is_open = Set(v);
        }
        if let Some(v) = req.delivery_radius_km {
            am.delivery_radius_km = Set(v);
        }
        if let Some(v) = req.minimum_order {
            am.minimum_order = Set(v);
        }
        if let Some(v) = req.free_delivery_threshold {
            am.free_delivery_threshold = Set(v);
        }
        if let Some(v) = req.vat_rate_bp {
            am.vat_rate_bp = Set(v);
        }
        if let Some(v) = req.pickup_fee {
            am.pickup_fee = Set(v);
        }
        if let Some(v) = req.delivery_fee_base {
            am.delivery_fee_base = Set(v);
        }
        if let Some(v) = req.delivery_fee_per_km {
            am.delivery_fee_per_km = Set(v);
        }
        if let Some(v) = req.accepts_cash {
            am.accepts_cash = Set(v);
        }
        if let Some(v) = req.accepts_card {
            am.accepts_card = Set(v);
        }
        if let Some(v) = req.accepts_mobile_money {
            am.accepts_mobile_money = Set(v);
        }
        if let Some(v) = req.maintenance_mode {
            am.maintenance_mode = Set(v);
        }
        if let Some(v) = req.maintenance_message {
            am.maintenance_message = Set(v);
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(self.pool.as_ref()).await?;
        log::info!("Restaurant settings updated");
        Ok(SettingsResponse::from_model(updated, local_time_now()))
    }

    pub async fn status(&self) -> StatusResponse {
        let settings = self.get().await;
        let database = settings.is_ok();
        if let Err(e) = &settings {
            log::error!("Status check could not read settings: {e}");
        }
        let now = Utc::now();
        match settings {
            Ok(s) => StatusResponse {
                database,
                is_open: s.is_open,
                is_accepting_orders: s.is_accepting_orders_at(local_time_now()),
                maintenance_mode: s.maintenance_mode,
                maintenance_message: s
                    .maintenance_mode
                    .then_some(s.maintenance_message),
                timestamp: now,
            },
            Err(_) => StatusResponse {
                database,
                is_open: false,
                is_accepting_orders: false,
                maintenance_mode: false,
                maintenance_message: None,
                timestamp: now,
            },
        }
    }

    pub async fn check_delivery_zone(&self, req: DeliveryZoneRequest) -> AppResult<DeliveryZoneResponse> {
        let s = self.get().await?;
        Ok(delivery_zone_for(&s, req.latitude, req.longitude))
    }
}

pub fn delivery_zone_for(s: &rs::Model, lat: f64, lng: f64) -> DeliveryZoneResponse {
    let pricing = s.delivery_pricing();
    let distance = pricing.distance_from_origin(lat, lng);
    let within_zone = distance <= pricing.radius_km;
    DeliveryZoneResponse {
        within_zone,
        distance_km: round_km(distance),
        delivery_radius_km: pricing.radius_km,
        delivery_fee: within_zone
            .then(|| pricing.base_fee + (pricing.per_km_fee as f64 * distance).round() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> rs::Model {
        rs::Model {
            id: SETTINGS_ID,
            name: "Chopsticks and Bowls".into(),
            description: String::new(),
            tagline: String::new(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            latitude: 9.0820,
            longitude: 7.3986,
            opening_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            closing_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
            opening_hours: None,
            is_open: true,
            delivery_radius_km: 10.0,
            minimum_order: 0,
            free_delivery_threshold: 2_000_000,
            vat_rate_bp: 750,
            pickup_fee: 0,
            delivery_fee_base: 200_000,
            delivery_fee_per_km: 15_000,
            accepts_cash: true,
            accepts_card: true,
            accepts_mobile_money: true,
            maintenance_mode: false,
            maintenance_message: String::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rejects_coordinates_outside_nigeria() {
        let req = UpdateSettingsRequest {
            latitude: Some(51.5),
            ..Default::default()
        };
        match validate_settings_update(&req, &settings()) {
            Err(AppError::FieldErrors(errs)) => assert_eq!(errs[0].field, "latitude"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_fee_table() {
        let req = UpdateSettingsRequest {
            vat_rate_bp: Some(12_000),
            pickup_fee: Some(-1),
            delivery_radius_km: Some(0.0),
            ..Default::default()
        };
        match validate_settings_update(&req, &settings()) {
            Err(AppError::FieldErrors(errs)) => {
                let fields: Vec<_> = errs.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"vat_rate_bp"));
                assert!(fields.contains(&"pickup_fee"));
                assert!(fields.contains(&"delivery_radius_km"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_accepts_valid_update() {
        let req = UpdateSettingsRequest {
            latitude: Some(6.45),
            longitude: Some(3.39),
            vat_rate_bp: Some(750),
            ..Default::default()
        };
        assert!(validate_settings_update(&req, &settings()).is_ok());
    }

    #[test]
    fn test_delivery_zone() {
        let s = settings();
        let inside = delivery_zone_for(&s, 9.0765, 7.4893);
        assert!(inside.within_zone);
        assert!(inside.delivery_fee.unwrap() > 200_000);

        // Lagos is far outside a 10 km radius around Abuja
        let outside = delivery_zone_for(&s, 6.5244, 3.3792);
        assert!(!outside.within_zone);
        assert!(outside.delivery_fee.is_none());
    }
}
