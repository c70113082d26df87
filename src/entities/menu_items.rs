use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Badge keys a menu item may carry
pub const MENU_BADGES: &[&str] = &[
    "spicy",
    "vegetarian",
    "vegan",
    "gluten_free",
    "popular",
    "new",
    "chef_special",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: String,
    /// kobo
    pub price: i64,
    pub image_url: Option<String>,
    /// JSON array of badge keys
    pub badges: Json,
    /// JSON array of allergen names
    pub allergens: Json,
    pub nutritional_info: Option<Json>,
    pub is_available: bool,
    pub is_featured: bool,
    /// minutes
    pub preparation_time: i32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn badge_list(&self) -> Vec<String> {
        string_list(&self.badges)
    }

    pub fn allergen_list(&self) -> Vec<String> {
        string_list(&self.allergens)
    }

    pub fn has_badge(&self, badge: &str) -> bool {
        self.badge_list().iter().any(|b| b == badge)
    }
}

fn string_list(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Unknown badge keys in `badges`, in input order
pub fn unknown_badges(badges: &[String]) -> Vec<String> {
    badges
        .iter()
        .filter(|b| !MENU_BADGES.contains(&b.as_str()))
        .cloned()
        .collect()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
