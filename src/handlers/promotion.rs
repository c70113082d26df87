use crate::middlewares::{current_user, require_user};
use crate::models::*;
use crate::services::PromotionService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/promotions/active",
    tag = "promotion",
    responses(
        (status = 200, description = "Codes that are active and inside their window", body = [PromoCodeResponse])
    )
)]
pub async fn active_promotions(promotion_service: web::Data<PromotionService>) -> Result<HttpResponse> {
    match promotion_service.active_promotions().await {
        Ok(promotions) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": promotions
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/promotions/{code}",
    tag = "promotion",
    params(
        ("code" = String, Path, description = "Promo code, case-insensitive")
    ),
    responses(
        (status = 200, description = "Promo code", body = PromoCodeResponse),
        (status = 404, description = "Promo code not found")
    )
)]
pub async fn get_promotion(
    promotion_service: web::Data<PromotionService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match promotion_service.get_promotion(&path).await {
        Ok(promotion) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": promotion
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/promotions/validate",
    tag = "promotion",
    request_body = ValidatePromoRequest,
    responses(
        (status = 200, description = "Validation outcome with the discount it would give", body = ValidatePromoResponse),
        (status = 400, description = "Malformed code or amount")
    )
)]
pub async fn validate_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    request: web::Json<ValidatePromoRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user(&req).map(|u| u.id);

    match promotion_service.validate(&request, user_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/promotions/usage",
    tag = "promotion",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Codes the caller has used", body = [PromoUsageResponse])
    )
)]
pub async fn usage_history(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match promotion_service.usage_history(user.id).await {
        Ok(usages) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": usages
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/promotions/apply/{order_id}",
    tag = "promotion",
    params(
        ("order_id" = i64, Path, description = "Order ID")
    ),
    request_body = ApplyPromoRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order with the discount applied", body = OrderResponse),
        (status = 400, description = "Code not usable for this order"),
        (status = 409, description = "A code is already applied to the order")
    )
)]
pub async fn apply_promotion(
    promotion_service: web::Data<PromotionService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<ApplyPromoRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match promotion_service
        .apply_to_order(user.id, path.into_inner(), &request.code)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn promotion_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/promotions")
            .route("/active", web::get().to(active_promotions))
            .route("/usage", web::get().to(usage_history))
            .route("/validate", web::post().to(validate_promotion))
            .route("/apply/{order_id}", web::post().to(apply_promotion))
            .route("/{code}", web::get().to(get_promotion)),
    );
}
