use crate::database::DbPool;
use crate::entities::{AddressType, address_entity as addr};
use crate::error::{AppError, AppResult};
use crate::external::{GeocodeResult, GeocodingService};
use crate::models::*;
use crate::services::settings_service::load_settings;
use crate::utils::geo::{round_km, within_nigeria};
use crate::utils::{ValidationErrors, normalize_ng_phone};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct AddressService {
    pool: DbPool,
    geocoder: GeocodingService,
}

fn validate_coordinates(errors: &mut ValidationErrors, lat: Option<f64>, lng: Option<f64>) {
    match (lat, lng) {
        (Some(lat), Some(lng)) => errors.check(
            within_nigeria(lat, lng),
            "latitude",
            "Coordinates must be within Nigeria",
        ),
        (None, None) => {}
        _ => errors.add("latitude", "Latitude and longitude must be provided together"),
    }
}

fn required(errors: &mut ValidationErrors, field: &str, value: &str) {
    errors.check(!value.trim().is_empty(), field, "This field is required");
}

/// Unset the default flag on every other address of the user.
async fn clear_other_defaults<C: ConnectionTrait>(db: &C, user_id: i64, keep_id: i64) -> AppResult<()> {
    addr::Entity::update_many()
        .col_expr(addr::Column::IsDefault, Expr::value(false))
        .filter(addr::Column::UserId.eq(user_id))
        .filter(addr::Column::Id.ne(keep_id))
        .filter(addr::Column::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

impl AddressService {
    pub fn new(pool: DbPool, geocoder: GeocodingService) -> Self {
        Self { pool, geocoder }
    }

    async fn find_owned<C: ConnectionTrait>(&self, db: &C, user_id: i64, id: i64) -> AppResult<addr::Model> {
        addr::Entity::find_by_id(id)
            .filter(addr::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
    }

    /// Geocoding failures are logged and leave the coordinates empty.
    async fn try_geocode(&self, address: &str) -> Option<GeocodeResult> {
        match self.geocoder.geocode(address).await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("Geocoding failed for new address: {e}");
                None
            }
        }
    }

    pub async fn list(&self, user_id: i64) -> AppResult<Vec<AddressResponse>> {
        let rows = addr::Entity::find()
            .filter(addr::Column::UserId.eq(user_id))
            .order_by_desc(addr::Column::IsDefault)
            .order_by_desc(addr::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(AddressResponse::from).collect())
    }

    pub async fn get(&self, user_id: i64, id: i64) -> AppResult<AddressResponse> {
        Ok(AddressResponse::from(self.find_owned(self.pool.as_ref(), user_id, id).await?))
    }

    pub async fn get_default(&self, user_id: i64) -> AppResult<AddressResponse> {
        addr::Entity::find()
            .filter(addr::Column::UserId.eq(user_id))
            .filter(addr::Column::IsDefault.eq(true))
            .one(self.pool.as_ref())
            .await?
            .map(AddressResponse::from)
            .ok_or_else(|| AppError::NotFound("No default address set".to_string()))
    }

    pub async fn create(&self, user_id: i64, req: CreateAddressRequest) -> AppResult<AddressResponse> {
        let mut errors = ValidationErrors::new();
        required(&mut errors, "full_name", &req.full_name);
        required(&mut errors, "address", &req.address);
        required(&mut errors, "city", &req.city);
        required(&mut errors, "state", &req.state);
        let phone = normalize_ng_phone(&req.phone);
        errors.check(phone.is_ok(), "phone", "Enter a valid Nigerian phone number");
        validate_coordinates(&mut errors, req.latitude, req.longitude);
        errors.into_result()?;

        let country = req
            .country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Nigeria".to_string());
        let mut am = addr::ActiveModel {
            user_id: Set(user_id),
            full_name: Set(req.full_name.trim().to_string()),
            phone: Set(phone?),
            address: Set(req.address.trim().to_string()),
            city: Set(req.city.trim().to_string()),
            state: Set(req.state.trim().to_string()),
            postal_code: Set(req.postal_code.filter(|p| !p.trim().is_empty())),
            country: Set(country),
            latitude: Set(req.latitude),
            longitude: Set(req.longitude),
            address_type: Set(req.address_type.unwrap_or(AddressType::Home)),
            ..Default::default()
        };
        if req.latitude.is_none() {
            let line = format!(
                "{}, {}, {}, Nigeria",
                req.address.trim(),
                req.city.trim(),
                req.state.trim()
            );
            if let Some(found) = self.try_geocode(&line).await {
                am.latitude = Set(Some(found.latitude));
                am.longitude = Set(Some(found.longitude));
            }
        }

        let txn = self.pool.begin().await?;
        let existing = addr::Entity::find()
            .filter(addr::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;
        // A user's first address becomes the default
        let make_default = req.is_default || existing == 0;
        am.is_default = Set(make_default);
        let created = am.insert(&txn).await?;
        if make_default {
            clear_other_defaults(&txn, user_id, created.id).await?;
        }
        txn.commit().await?;
        Ok(AddressResponse::from(created))
    }

    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        req: UpdateAddressRequest,
    ) -> AppResult<AddressResponse> {
        let current = self.find_owned(self.pool.as_ref(), user_id, id).await?;
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("full_name", &req.full_name),
            ("address", &req.address),
            ("city", &req.city),
            ("state", &req.state),
        ] {
            if let Some(v) = value {
                required(&mut errors, field, v);
            }
        }
        let phone = req.phone.as_deref().map(normalize_ng_phone);
        if let Some(Err(_)) = &phone {
            errors.add("phone", "Enter a valid Nigerian phone number");
        }
        if req.latitude.is_some() || req.longitude.is_some() {
            validate_coordinates(&mut errors, req.latitude, req.longitude);
        }
        errors.into_result()?;

        let location_changed = req.address.is_some() || req.city.is_some() || req.state.is_some();
        let mut am = current.into_active_model();
        if let Some(v) = req.full_name {
            am.full_name = Set(v.trim().to_string());
        }
        if let Some(v) = phone {
            am.phone = Set(v?);
        }
        if let Some(v) = req.address {
            am.address = Set(v.trim().to_string());
        }
        if let Some(v) = req.city {
            am.city = Set(v.trim().to_string());
        }
        if let Some(v) = req.state {
            am.state = Set(v.trim().to_string());
        }
        if let Some(v) = req.postal_code {
            am.postal_code = Set(Some(v).filter(|p| !p.trim().is_empty()));
        }
        if let Some(v) = req.country {
            am.country = Set(v);
        }
        if let Some(v) = req.address_type {
            am.address_type = Set(v);
        }
        if req.latitude.is_some() {
            am.latitude = Set(req.latitude);
            am.longitude = Set(req.longitude);
        } else if location_changed {
            // Stale coordinates are worse than none
            am.latitude = Set(None);
            am.longitude = Set(None);
        }
        am.updated_at = Set(Utc::now());

        let txn = self.pool.begin().await?;
        if let Some(is_default) = req.is_default {
            am.is_default = Set(is_default);
        }
        let updated = am.update(&txn).await?;
        if updated.is_default {
            clear_other_defaults(&txn, user_id, updated.id).await?;
        }
        txn.commit().await?;

        if location_changed && req.latitude.is_none() {
            if let Some(found) = self.try_geocode(&updated.one_line()).await {
                let mut am = updated.into_active_model();
                am.latitude = Set(Some(found.latitude));
                am.longitude = Set(Some(found.longitude));
                let updated = am.update(self.pool.as_ref()).await?;
                return Ok(AddressResponse::from(updated));
            }
        }
        Ok(AddressResponse::from(updated))
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;
        let address = self.find_owned(&txn, user_id, id).await?;
        addr::Entity::delete_by_id(address.id).exec(&txn).await?;
        if address.is_default {
            // Promote the most recent remaining address
            if let Some(next) = addr::Entity::find()
                .filter(addr::Column::UserId.eq(user_id))
                .order_by_desc(addr::Column::CreatedAt)
                .one(&txn)
                .await?
            {
                let mut am = next.into_active_model();
                am.is_default = Set(true);
                am.update(&txn).await?;
            }
        }
        txn.commit().await?;
        Ok(())
    }

    pub async fn set_default(&self, user_id: i64, id: i64) -> AppResult<AddressResponse> {
        let txn = self.pool.begin().await?;
        let address = self.find_owned(&txn, user_id, id).await?;
        clear_other_defaults(&txn, user_id, address.id).await?;
        let mut am = address.into_active_model();
        am.is_default = Set(true);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;
        txn.commit().await?;
        Ok(AddressResponse::from(updated))
    }

    async fn with_zone(&self, found: GeocodeResult) -> AppResult<GeocodeResponse> {
        let settings = load_settings(self.pool.as_ref()).await?;
        let pricing = settings.delivery_pricing();
        let distance = pricing.distance_from_origin(found.latitude, found.longitude);
        Ok(GeocodeResponse {
            latitude: found.latitude,
            longitude: found.longitude,
            formatted_address: found.formatted_address,
            confidence: found.confidence,
            within_delivery_zone: distance <= pricing.radius_km,
            distance_km: round_km(distance),
        })
    }

    pub async fn geocode(&self, req: GeocodeRequest) -> AppResult<GeocodeResponse> {
        if req.address.trim().len() < 5 {
            return Err(AppError::field("address", "Address is too short to geocode"));
        }
        if !self.geocoder.is_enabled() {
            return Err(AppError::ConfigError("Geocoding is not configured".into()));
        }
        let found = self
            .geocoder
            .geocode(req.address.trim())
            .await?
            .ok_or_else(|| AppError::NotFound("Address could not be located".into()))?;
        self.with_zone(found).await
    }

    pub async fn reverse_geocode(&self, req: ReverseGeocodeRequest) -> AppResult<GeocodeResponse> {
        if !within_nigeria(req.latitude, req.longitude) {
            return Err(AppError::field("latitude", "Coordinates must be within Nigeria"));
        }
        if !self.geocoder.is_enabled() {
            return Err(AppError::ConfigError("Geocoding is not configured".into()));
        }
        let found = self
            .geocoder
            .reverse_geocode(req.latitude, req.longitude)
            .await?
            .ok_or_else(|| AppError::NotFound("No address found for these coordinates".into()))?;
        self.with_zone(found).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_must_come_in_pairs() {
        let mut errors = ValidationErrors::new();
        validate_coordinates(&mut errors, Some(9.0), None);
        assert!(errors.into_result().is_err());

        let mut errors = ValidationErrors::new();
        validate_coordinates(&mut errors, None, None);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_coordinates_outside_nigeria_rejected() {
        let mut errors = ValidationErrors::new();
        validate_coordinates(&mut errors, Some(51.5), Some(-0.12));
        assert!(errors.into_result().is_err());

        let mut errors = ValidationErrors::new();
        validate_coordinates(&mut errors, Some(9.07), Some(7.49));
        assert!(errors.into_result().is_ok());
    }
}
