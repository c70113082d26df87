use crate::models::*;
use crate::services::MenuService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/menu/categories",
    tag = "menu",
    responses(
        (status = 200, description = "Active categories", body = [CategoryResponse])
    )
)]
pub async fn list_categories(menu_service: web::Data<MenuService>) -> Result<HttpResponse> {
    match menu_service.list_categories().await {
        Ok(categories) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": categories
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/categories/{id}",
    tag = "menu",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category with its available items", body = CategoryDetailResponse),
        (status = 404, description = "Category not found")
    )
)]
pub async fn get_category(
    menu_service: web::Data<MenuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match menu_service.get_category(path.into_inner()).await {
        Ok(category) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": category
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/categories/{id}/items",
    tag = "menu",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Available items of the category", body = [MenuItemResponse]),
        (status = 404, description = "Category not found")
    )
)]
pub async fn category_items(
    menu_service: web::Data<MenuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match menu_service.category_items(path.into_inner()).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/items",
    tag = "menu",
    params(MenuItemQuery),
    responses(
        (status = 200, description = "Available items matching the filters", body = [MenuItemResponse]),
        (status = 400, description = "Unknown badge or bad price range")
    )
)]
pub async fn list_items(
    menu_service: web::Data<MenuService>,
    query: web::Query<MenuItemQuery>,
) -> Result<HttpResponse> {
    match menu_service.list_items(&query).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/items/featured",
    tag = "menu",
    responses(
        (status = 200, description = "Featured items", body = [MenuItemResponse])
    )
)]
pub async fn featured_items(menu_service: web::Data<MenuService>) -> Result<HttpResponse> {
    match menu_service.featured_items().await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/items/{id}",
    tag = "menu",
    params(
        ("id" = i64, Path, description = "Menu item ID")
    ),
    responses(
        (status = 200, description = "Menu item", body = MenuItemResponse),
        (status = 404, description = "Menu item not found")
    )
)]
pub async fn get_item(
    menu_service: web::Data<MenuService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match menu_service.get_item(path.into_inner()).await {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/menu/search",
    tag = "menu",
    params(MenuSearchQuery),
    responses(
        (status = 200, description = "Items whose name, description or category matches", body = [MenuItemResponse]),
        (status = 400, description = "Missing search term")
    )
)]
pub async fn search(
    menu_service: web::Data<MenuService>,
    query: web::Query<MenuSearchQuery>,
) -> Result<HttpResponse> {
    match menu_service.search(query.q.as_deref()).await {
        Ok(items) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": items
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn menu_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/menu")
            .route("/categories", web::get().to(list_categories))
            .route("/categories/{id}", web::get().to(get_category))
            .route("/categories/{id}/items", web::get().to(category_items))
            .route("/items", web::get().to(list_items))
            .route("/items/featured", web::get().to(featured_items))
            .route("/items/{id}", web::get().to(get_item))
            .route("/search", web::get().to(search)),
    );
}
