//! Staff console. Every route here requires a staff token.

use crate::error::AppError;
use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::upload_service::MAX_UPLOAD_SIZE;
use crate::services::{
    AdminService, LoyaltyService, MenuService, OrderService, PromotionService, SettingsService,
    UploadService, UserService,
};
use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use futures_util::StreamExt;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/admin/dashboard",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Store-wide counters", body = DashboardStats),
        (status = 403, description = "Staff only")
    )
)]
pub async fn dashboard(
    admin_service: web::Data<AdminService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match admin_service.dashboard().await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/orders",
    tag = "admin",
    params(OrderQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "All orders, newest first", body = PaginatedResponse<OrderSummary>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match order_service.list_all(&query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{id}/status",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match order_service.update_status(path.into_inner(), request.into_inner().status).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/categories",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every category, including inactive ones", body = [CategoryResponse]),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_categories(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.all_categories().await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    tag = "admin",
    request_body = CreateCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_category(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    request: web::Json<CreateCategoryRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.create_category(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 404, description = "Category not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_category(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateCategoryRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.update_category(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Category still has items"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_category(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.delete_category(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Category deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/items",
    tag = "admin",
    params(MenuItemQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every menu item, optionally for one category", body = [MenuItemResponse]),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_items(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    query: web::Query<MenuItemQuery>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.all_items(query.category_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/items",
    tag = "admin",
    request_body = CreateMenuItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Menu item created", body = MenuItemResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_item(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    request: web::Json<CreateMenuItemRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.create_item(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/items/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Menu item ID")
    ),
    request_body = UpdateMenuItemRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Menu item updated", body = MenuItemResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Menu item not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_item(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateMenuItemRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.update_item(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/items/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Menu item ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Menu item deleted"),
        (status = 404, description = "Menu item not found"),
        (status = 409, description = "Item appears on orders"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_item(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.delete_item(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Menu item deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/items/{id}/toggle-availability",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Menu item ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Availability flipped", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn toggle_item_availability(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.toggle_availability(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/items/{id}/toggle-featured",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Menu item ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Featured flag flipped", body = MenuItemResponse),
        (status = 404, description = "Menu item not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn toggle_item_featured(
    menu_service: web::Data<MenuService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match menu_service.toggle_featured(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/rewards",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every reward", body = [RewardResponse]),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_rewards(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.all_rewards().await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/rewards",
    tag = "admin",
    request_body = CreateRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Reward created", body = RewardResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_reward(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<CreateRewardRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.create_reward(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/rewards/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Reward ID")
    ),
    request_body = UpdateRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reward updated", body = RewardResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Reward not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_reward(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateRewardRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.update_reward(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/rewards/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Reward ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reward deleted"),
        (status = 404, description = "Reward not found"),
        (status = 409, description = "Reward has been redeemed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_reward(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.delete_reward(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Reward deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/promotions",
    tag = "admin",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every promo code", body = PaginatedResponse<PromoCodeResponse>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_promotions(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match promotion_service.list_all(&query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/promotions",
    tag = "admin",
    request_body = CreatePromoCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Promo code created", body = PromoCodeResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Code already exists"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn create_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    request: web::Json<CreatePromoCodeRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match promotion_service.create(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/promotions/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Promo code ID")
    ),
    request_body = UpdatePromoCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promo code updated", body = PromoCodeResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Promo code not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdatePromoCodeRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match promotion_service.update(path.into_inner(), request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/promotions/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Promo code ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Promo code deleted"),
        (status = 404, description = "Promo code not found"),
        (status = 409, description = "Code has been used"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn delete_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match promotion_service.delete(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Promo code deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/loyalty/cards",
    tag = "admin",
    params(CardListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Loyalty cards", body = PaginatedResponse<LoyaltyCardResponse>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_cards(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    query: web::Query<CardListQuery>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.list_cards(&query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/loyalty/cards/generate",
    tag = "admin",
    request_body = GenerateCardsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Unassigned cards created", body = [LoyaltyCardResponse]),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn generate_cards(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<GenerateCardsRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.generate_cards(request.count).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/loyalty/cards/{id}",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Loyalty card", body = LoyaltyCardResponse),
        (status = 404, description = "Card not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn get_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.card_detail(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/loyalty/cards/{id}/link",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Card ID")
    ),
    request_body = LinkCardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card linked to the user", body = LoyaltyCardResponse),
        (status = 404, description = "Card or user not found"),
        (status = 409, description = "Card or user already linked"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn link_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<LinkCardRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.link_card(path.into_inner(), request.user_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/loyalty/cards/{id}/unlink",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card detached from its user", body = LoyaltyCardResponse),
        (status = 404, description = "Card not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn unlink_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.unlink_card(path.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/loyalty/cards/{id}/activate",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card activated", body = LoyaltyCardResponse),
        (status = 404, description = "Card not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn activate_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.set_card_active(path.into_inner(), true).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/loyalty/cards/{id}/deactivate",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "Card ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card deactivated", body = LoyaltyCardResponse),
        (status = 404, description = "Card not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn deactivate_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.set_card_active(path.into_inner(), false).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/loyalty/dashboard",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card and scan statistics", body = ScanDashboardResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn scan_dashboard(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match loyalty_service.scan_dashboard().await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Restaurant settings", body = SettingsResponse),
        (status = 403, description = "Staff only")
    )
)]
pub async fn get_settings(
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match settings_service.settings().await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/settings",
    tag = "admin",
    request_body = UpdateSettingsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Settings updated", body = SettingsResponse),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn update_settings(
    settings_service: web::Data<SettingsService>,
    req: HttpRequest,
    request: web::Json<UpdateSettingsRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match settings_service.update(request.into_inner()).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "admin",
    params(UserListQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Accounts, newest first", body = PaginatedResponse<AdminUserResponse>),
        (status = 403, description = "Staff only")
    )
)]
pub async fn list_users(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match user_service.list_users(&query).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/users/{id}/staff",
    tag = "admin",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = SetStaffRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Staff flag changed; applies from the user's next token", body = AdminUserResponse),
        (status = 404, description = "User not found"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn set_staff(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<SetStaffRequest>,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    match user_service.set_staff(path.into_inner(), request.is_staff).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Scanner input at the counter: the raw QR payload as read by the device.
#[utoipa::path(
    post,
    path = "/admin/loyalty/scan",
    tag = "admin",
    request_body = ScanCardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Visit recorded", body = ScanCardResponse),
        (status = 400, description = "Invalid, inactive or too recently scanned card"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn scan_card(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<ScanCardRequest>,
) -> Result<HttpResponse> {
    let staff = require_staff(&req)?;

    match loyalty_service
        .scan_card(request.into_inner(), Some(staff.id))
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Image upload. Reads the multipart field `file`; other fields are ignored.
#[utoipa::path(
    post,
    path = "/admin/uploads",
    tag = "admin",
    request_body(content = String, content_type = "multipart/form-data", description = "Image in the `file` field"),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Missing, oversized or unsupported file"),
        (status = 403, description = "Staff only")
    )
)]
pub async fn upload_image(
    upload_service: web::Data<UploadService>,
    req: HttpRequest,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    require_staff(&req)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = payload.next().await {
        let mut field = field?;
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk?;
            data.extend_from_slice(&chunk);
            // Anything past the limit is rejected by process_image; no need to read on.
            if data.len() > MAX_UPLOAD_SIZE {
                break;
            }
        }
        upload = Some((filename, data));
        break;
    }

    let Some((filename, data)) = upload else {
        return Ok(AppError::field("file", "No file provided").error_response());
    };

    match upload_service.save_image(&data, &filename).await {
        Ok(result) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .route("/orders", web::get().to(list_orders))
            .route("/orders/{id}/status", web::put().to(update_order_status))
            .route("/categories", web::get().to(list_categories))
            .route("/categories", web::post().to(create_category))
            .route("/categories/{id}", web::put().to(update_category))
            .route("/categories/{id}", web::delete().to(delete_category))
            .route("/items", web::get().to(list_items))
            .route("/items", web::post().to(create_item))
            .route("/items/{id}", web::put().to(update_item))
            .route("/items/{id}", web::delete().to(delete_item))
            .route("/items/{id}/toggle-availability", web::post().to(toggle_item_availability))
            .route("/items/{id}/toggle-featured", web::post().to(toggle_item_featured))
            .route("/rewards", web::get().to(list_rewards))
            .route("/rewards", web::post().to(create_reward))
            .route("/rewards/{id}", web::put().to(update_reward))
            .route("/rewards/{id}", web::delete().to(delete_reward))
            .route("/promotions", web::get().to(list_promotions))
            .route("/promotions", web::post().to(create_promotion))
            .route("/promotions/{id}", web::put().to(update_promotion))
            .route("/promotions/{id}", web::delete().to(delete_promotion))
            .route("/loyalty/cards", web::get().to(list_cards))
            .route("/loyalty/cards/generate", web::post().to(generate_cards))
            .route("/loyalty/cards/{id}", web::get().to(get_card))
            .route("/loyalty/cards/{id}/link", web::post().to(link_card))
            .route("/loyalty/cards/{id}/unlink", web::post().to(unlink_card))
            .route("/loyalty/cards/{id}/activate", web::post().to(activate_card))
            .route("/loyalty/cards/{id}/deactivate", web::post().to(deactivate_card))
            .route("/loyalty/scan", web::post().to(scan_card))
            .route("/loyalty/dashboard", web::get().to(scan_dashboard))
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(update_settings))
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/staff", web::put().to(set_staff))
            .route("/uploads", web::post().to(upload_image)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::AuthMiddleware;
    use crate::utils::JwtService;
    use actix_web::{App, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    fn admin_service() -> AdminService {
        AdminService::new(Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()))
    }

    #[actix_web::test]
    async fn test_customer_cannot_reach_dashboard() {
        let svc = jwt();
        let token = svc.generate_access_token(7, "ada@example.com", false).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(svc))
                .app_data(web::Data::new(admin_service()))
                .service(web::scope("/api/v1").configure(admin_config)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/admin/dashboard")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);
    }

    #[actix_web::test]
    async fn test_anonymous_caller_is_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .app_data(web::Data::new(admin_service()))
                .service(web::scope("/api/v1").configure(admin_config)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/admin/dashboard").to_request();
        let err = test::try_call_service(&app, req).await.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), 401);
    }
}
