use crate::database::DbPool;
use crate::entities::menu_items::unknown_badges;
use crate::entities::{category_entity as cat, menu_item_entity as item, order_item_entity};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::ValidationErrors;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde_json::json;
use std::collections::HashMap;

#[derive(Clone)]
pub struct MenuService {
    pool: DbPool,
}

fn ci_like<C: ColumnTrait>(column: C, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern.to_string())
}

fn validate_item_fields(
    errors: &mut ValidationErrors,
    name: Option<&str>,
    price: Option<i64>,
    badges: Option<&[String]>,
    preparation_time: Option<i32>,
) {
    if let Some(name) = name {
        errors.check(!name.trim().is_empty(), "name", "Name is required");
    }
    if let Some(price) = price {
        errors.check(price > 0, "price", "Price must be greater than zero");
    }
    if let Some(badges) = badges {
        let unknown = unknown_badges(badges);
        if !unknown.is_empty() {
            errors.add("badges", format!("Unknown badges: {}", unknown.join(", ")));
        }
    }
    if let Some(minutes) = preparation_time {
        errors.check(minutes >= 0, "preparation_time", "Preparation time cannot be negative");
    }
}

impl MenuService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn available_items() -> Select<item::Entity> {
        item::Entity::find()
            .filter(item::Column::IsAvailable.eq(true))
            .order_by_asc(item::Column::SortOrder)
            .order_by_asc(item::Column::Name)
    }

    async fn active_category(&self, id: i64) -> AppResult<cat::Model> {
        cat::Entity::find_by_id(id)
            .filter(cat::Column::IsActive.eq(true))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
    }

    pub async fn list_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let categories = cat::Entity::find()
            .filter(cat::Column::IsActive.eq(true))
            .order_by_asc(cat::Column::SortOrder)
            .order_by_asc(cat::Column::Name)
            .all(self.pool.as_ref())
            .await?;

        let category_ids: Vec<i64> = item::Entity::find()
            .select_only()
            .column(item::Column::CategoryId)
            .filter(item::Column::IsAvailable.eq(true))
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;
        let mut counts: HashMap<i64, u64> = HashMap::new();
        for id in category_ids {
            *counts.entry(id).or_default() += 1;
        }

        Ok(categories
            .into_iter()
            .map(|c| {
                let count = counts.get(&c.id).copied().unwrap_or(0);
                let mut resp = CategoryResponse::from(c);
                resp.items_count = Some(count);
                resp
            })
            .collect())
    }

    pub async fn get_category(&self, id: i64) -> AppResult<CategoryDetailResponse> {
        let category = self.active_category(id).await?;
        let items = self.category_items(id).await?;
        Ok(CategoryDetailResponse {
            category: CategoryResponse::from(category),
            items,
        })
    }

    pub async fn category_items(&self, category_id: i64) -> AppResult<Vec<MenuItemResponse>> {
        self.active_category(category_id).await?;
        let items = Self::available_items()
            .filter(item::Column::CategoryId.eq(category_id))
            .all(self.pool.as_ref())
            .await?;
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }

    pub async fn list_items(&self, query: &MenuItemQuery) -> AppResult<Vec<MenuItemResponse>> {
        let mut select = Self::available_items();
        if let Some(category_id) = query.category_id {
            select = select.filter(item::Column::CategoryId.eq(category_id));
        }
        if let Some(min) = query.min_price {
            select = select.filter(item::Column::Price.gte(min));
        }
        if let Some(max) = query.max_price {
            select = select.filter(item::Column::Price.lte(max));
        }
        if let Some(featured) = query.is_featured {
            select = select.filter(item::Column::IsFeatured.eq(featured));
        }
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", q.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(ci_like(item::Column::Name, &pattern))
                    .add(ci_like(item::Column::Description, &pattern)),
            );
        }
        let mut items = select.all(self.pool.as_ref()).await?;
        if let Some(badge) = query.badge.as_deref().filter(|b| !b.is_empty()) {
            items.retain(|i| i.has_badge(badge));
        }
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }

    pub async fn get_item(&self, id: i64) -> AppResult<MenuItemResponse> {
        item::Entity::find_by_id(id)
            .filter(item::Column::IsAvailable.eq(true))
            .one(self.pool.as_ref())
            .await?
            .map(MenuItemResponse::from)
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))
    }

    pub async fn featured_items(&self) -> AppResult<Vec<MenuItemResponse>> {
        let items = Self::available_items()
            .filter(item::Column::IsFeatured.eq(true))
            .all(self.pool.as_ref())
            .await?;
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }

    /// Case-insensitive match on item name, description or category name.
    pub async fn search(&self, q: Option<&str>) -> AppResult<Vec<MenuItemResponse>> {
        let q = q.map(str::trim).filter(|q| !q.is_empty()).ok_or_else(|| {
            AppError::field("q", "Search query is required")
        })?;
        let pattern = format!("%{}%", q.to_lowercase());

        let category_ids: Vec<i64> = cat::Entity::find()
            .select_only()
            .column(cat::Column::Id)
            .filter(cat::Column::IsActive.eq(true))
            .filter(ci_like(cat::Column::Name, &pattern))
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        let mut condition = Condition::any()
            .add(ci_like(item::Column::Name, &pattern))
            .add(ci_like(item::Column::Description, &pattern));
        if !category_ids.is_empty() {
            condition = condition.add(item::Column::CategoryId.is_in(category_ids));
        }
        let items = Self::available_items()
            .filter(condition)
            .all(self.pool.as_ref())
            .await?;
        Ok(items.into_iter().map(MenuItemResponse::from).collect())
    }

    // Staff operations

    pub async fn all_categories(&self) -> AppResult<Vec<CategoryResponse>> {
        let rows = cat::Entity::find()
            .order_by_asc(cat::Column::SortOrder)
            .order_by_asc(cat::Column::Name)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(CategoryResponse::from).collect())
    }

    pub async fn create_category(&self, req: CreateCategoryRequest) -> AppResult<CategoryResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::field("name", "Name is required"));
        }
        let created = cat::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            image_url: Set(req.image_url),
            is_active: Set(req.is_active.unwrap_or(true)),
            sort_order: Set(req.sort_order.unwrap_or(0)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;
        log::info!("Category created: {} ({})", created.name, created.id);
        Ok(CategoryResponse::from(created))
    }

    pub async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> AppResult<CategoryResponse> {
        let category = cat::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
        let mut am = category.into_active_model();
        if let Some(v) = req.name {
            if v.trim().is_empty() {
                return Err(AppError::field("name", "Name is required"));
            }
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.image_url {
            am.image_url = Set(Some(v).filter(|u| !u.is_empty()));
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = req.sort_order {
            am.sort_order = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(CategoryResponse::from(am.update(self.pool.as_ref()).await?))
    }

    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let item_ids: Vec<i64> = item::Entity::find()
            .select_only()
            .column(item::Column::Id)
            .filter(item::Column::CategoryId.eq(id))
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;
        if !item_ids.is_empty() {
            let ordered = order_item_entity::Entity::find()
                .filter(order_item_entity::Column::MenuItemId.is_in(item_ids))
                .count(self.pool.as_ref())
                .await?;
            if ordered > 0 {
                return Err(AppError::Conflict(
                    "Category has items that appear in orders; deactivate it instead".into(),
                ));
            }
        }
        let res = cat::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
        log::info!("Category {id} deleted");
        Ok(())
    }

    pub async fn all_items(&self, category_id: Option<i64>) -> AppResult<Vec<MenuItemResponse>> {
        let mut select = item::Entity::find()
            .order_by_asc(item::Column::CategoryId)
            .order_by_asc(item::Column::SortOrder)
            .order_by_asc(item::Column::Name);
        if let Some(category_id) = category_id {
            select = select.filter(item::Column::CategoryId.eq(category_id));
        }
        let rows = select.all(self.pool.as_ref()).await?;
        Ok(rows.into_iter().map(MenuItemResponse::from).collect())
    }

    async fn ensure_category(&self, category_id: i64) -> AppResult<()> {
        let exists = cat::Entity::find_by_id(category_id).count(self.pool.as_ref()).await?;
        if exists == 0 {
            return Err(AppError::field("category_id", "Category does not exist"));
        }
        Ok(())
    }

    pub async fn create_item(&self, req: CreateMenuItemRequest) -> AppResult<MenuItemResponse> {
        let mut errors = ValidationErrors::new();
        validate_item_fields(
            &mut errors,
            Some(&req.name),
            Some(req.price),
            Some(&req.badges),
            req.preparation_time,
        );
        errors.into_result()?;
        self.ensure_category(req.category_id).await?;

        let created = item::ActiveModel {
            category_id: Set(req.category_id),
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            price: Set(req.price),
            image_url: Set(req.image_url),
            badges: Set(json!(req.badges)),
            allergens: Set(json!(req.allergens)),
            nutritional_info: Set(req.nutritional_info),
            is_available: Set(req.is_available.unwrap_or(true)),
            is_featured: Set(req.is_featured.unwrap_or(false)),
            preparation_time: Set(req.preparation_time.unwrap_or(15)),
            sort_order: Set(req.sort_order.unwrap_or(0)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;
        log::info!("Menu item created: {} ({})", created.name, created.id);
        Ok(MenuItemResponse::from(created))
    }

    pub async fn update_item(&self, id: i64, req: UpdateMenuItemRequest) -> AppResult<MenuItemResponse> {
        let current = item::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
        let mut errors = ValidationErrors::new();
        validate_item_fields(
            &mut errors,
            req.name.as_deref(),
            req.price,
            req.badges.as_deref(),
            req.preparation_time,
        );
        errors.into_result()?;
        if let Some(category_id) = req.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut am = current.into_active_model();
        if let Some(v) = req.category_id {
            am.category_id = Set(v);
        }
        if let Some(v) = req.name {
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.price {
            am.price = Set(v);
        }
        if let Some(v) = req.image_url {
            am.image_url = Set(Some(v).filter(|u| !u.is_empty()));
        }
        if let Some(v) = req.badges {
            am.badges = Set(json!(v));
        }
        if let Some(v) = req.allergens {
            am.allergens = Set(json!(v));
        }
        if let Some(v) = req.nutritional_info {
            am.nutritional_info = Set(Some(v));
        }
        if let Some(v) = req.is_available {
            am.is_available = Set(v);
        }
        if let Some(v) = req.is_featured {
            am.is_featured = Set(v);
        }
        if let Some(v) = req.preparation_time {
            am.preparation_time = Set(v);
        }
        if let Some(v) = req.sort_order {
            am.sort_order = Set(v);
        }
        am.updated_at = Set(Utc::now());
        Ok(MenuItemResponse::from(am.update(self.pool.as_ref()).await?))
    }

    pub async fn toggle_availability(&self, id: i64) -> AppResult<MenuItemResponse> {
        self.flip(id, item::Column::IsAvailable).await
    }

    pub async fn toggle_featured(&self, id: i64) -> AppResult<MenuItemResponse> {
        self.flip(id, item::Column::IsFeatured).await
    }

    async fn flip(&self, id: i64, column: item::Column) -> AppResult<MenuItemResponse> {
        let res = item::Entity::update_many()
            .col_expr(column, Expr::col(column).not())
            .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(item::Column::Id.eq(id))
            .exec(self.pool.as_ref())
            .await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Menu item not found".to_string()));
        }
        let updated = item::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Menu item not found".to_string()))?;
        Ok(MenuItemResponse::from(updated))
    }

    pub async fn delete_item(&self, id: i64) -> AppResult<()> {
        let ordered = order_item_entity::Entity::find()
            .filter(order_item_entity::Column::MenuItemId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if ordered > 0 {
            return Err(AppError::Conflict(
                "Item appears in orders; mark it unavailable instead".into(),
            ));
        }
        let res = item::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Menu item not found".to_string()));
        }
        log::info!("Menu item {id} deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_validation() {
        let mut errors = ValidationErrors::new();
        validate_item_fields(
            &mut errors,
            Some(""),
            Some(0),
            Some(&["spicy".to_string(), "keto".to_string()]),
            Some(-5),
        );
        match errors.into_result() {
            Err(AppError::FieldErrors(errs)) => {
                assert_eq!(errs.len(), 4);
                let badges = errs.iter().find(|e| e.field == "badges").unwrap();
                assert!(badges.message.contains("keto"));
                assert!(!badges.message.contains("spicy"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_partial_update_only_checks_present_fields() {
        let mut errors = ValidationErrors::new();
        validate_item_fields(&mut errors, None, Some(150_000), None, None);
        assert!(errors.into_result().is_ok());
    }
}
