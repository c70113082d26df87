use crate::entities::{category_entity, menu_item_entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    /// Number of available items, filled on list endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_count: Option<u64>,
}

impl From<category_entity::Model> for CategoryResponse {
    fn from(c: category_entity::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            image_url: c.image_url,
            is_active: c.is_active,
            sort_order: c.sort_order,
            items_count: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MenuItemResponse {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    /// kobo
    pub price: i64,
    pub image_url: Option<String>,
    pub badges: Vec<String>,
    pub allergens: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub nutritional_info: Option<Value>,
    pub is_available: bool,
    pub is_featured: bool,
    pub preparation_time: i32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<menu_item_entity::Model> for MenuItemResponse {
    fn from(m: menu_item_entity::Model) -> Self {
        let badges = m.badge_list();
        let allergens = m.allergen_list();
        Self {
            id: m.id,
            category_id: m.category_id,
            name: m.name,
            description: m.description,
            price: m.price,
            image_url: m.image_url,
            badges,
            allergens,
            nutritional_info: m.nutritional_info,
            is_available: m.is_available,
            is_featured: m.is_featured,
            preparation_time: m.preparation_time,
            sort_order: m.sort_order,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryDetailResponse {
    #[serde(flatten)]
    pub category: CategoryResponse,
    pub items: Vec<MenuItemResponse>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuItemQuery {
    pub category_id: Option<i64>,
    pub badge: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub is_featured: Option<bool>,
    /// Matched against name and description
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MenuSearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateMenuItemRequest {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// kobo
    pub price: i64,
    pub image_url: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub allergens: Vec<String>,
    #[schema(value_type = Option<Object>)]
    pub nutritional_info: Option<Value>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_time: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateMenuItemRequest {
    pub category_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub badges: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub nutritional_info: Option<Value>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
    pub preparation_time: Option<i32>,
    pub sort_order: Option<i32>,
}
