use crate::entities::{AddressType, address_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub full_name: String,
    #[schema(example = "08031234567")]
    pub phone: String,
    #[schema(example = "12 Aminu Kano Crescent, Wuse 2")]
    pub address: String,
    #[schema(example = "Abuja")]
    pub city: String,
    #[schema(example = "FCT")]
    pub state: String,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_default: bool,
    pub address_type: Option<AddressType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: Option<bool>,
    pub address_type: Option<AddressType>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_default: bool,
    pub address_type: AddressType,
    pub full_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<address_entity::Model> for AddressResponse {
    fn from(a: address_entity::Model) -> Self {
        let full_address = a.one_line();
        Self {
            id: a.id,
            full_name: a.full_name,
            phone: a.phone,
            address: a.address,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            latitude: a.latitude,
            longitude: a.longitude,
            is_default: a.is_default,
            address_type: a.address_type,
            full_address,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeocodeRequest {
    #[schema(example = "12 Aminu Kano Crescent, Wuse 2, Abuja")]
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReverseGeocodeRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeocodeResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: String,
    pub confidence: String,
    pub within_delivery_zone: bool,
    pub distance_km: f64,
}
