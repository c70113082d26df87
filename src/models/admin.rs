use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub orders_today: u64,
    /// kobo, paid orders only
    pub revenue_today: i64,
    pub total_revenue: i64,
    pub menu_items: u64,
    pub active_promo_codes: u64,
    pub loyalty_cards: u64,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    /// Matched against email, first and last name
    pub q: Option<String>,
    pub is_staff: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub is_staff: bool,
    pub is_active: bool,
    pub referral_code: String,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for AdminUserResponse {
    fn from(u: user_entity::Model) -> Self {
        let full_name = u.full_name();
        Self {
            id: u.id,
            email: u.email,
            full_name,
            phone: u.phone,
            is_staff: u.is_staff,
            is_active: u.is_active,
            referral_code: u.referral_code,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetStaffRequest {
    pub is_staff: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub url: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}
