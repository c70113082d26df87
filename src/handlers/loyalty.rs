use crate::middlewares::{require_staff, require_user};
use crate::models::*;
use crate::services::LoyaltyService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/loyalty/points",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points balance and tier", body = PointsBalanceResponse)
    )
)]
pub async fn get_points(loyalty_service: web::Data<LoyaltyService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.balance(user.id).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": balance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/points/history",
    tag = "loyalty",
    params(PaginationParams),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points ledger, newest first", body = PaginatedResponse<PointsTransactionResponse>)
    )
)]
pub async fn get_points_history(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.history(user.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/points/preview",
    tag = "loyalty",
    request_body = PointsPreviewRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Points an order of this size would earn", body = PointsPreviewResponse)
    )
)]
pub async fn preview_points(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<PointsPreviewRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.preview(user.id, request.order_amount).await {
        Ok(preview) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": preview
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/rewards",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rewards that can be redeemed now", body = [RewardResponse])
    )
)]
pub async fn list_rewards(loyalty_service: web::Data<LoyaltyService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.available_rewards(Some(user.id)).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rewards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/rewards/mine",
    tag = "loyalty",
    params(UserRewardQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's redeemed rewards", body = [UserRewardResponse])
    )
)]
pub async fn my_rewards(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    query: web::Query<UserRewardQuery>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.my_rewards(user.id, &query).await {
        Ok(rewards) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": rewards
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/rewards/redeem",
    tag = "loyalty",
    request_body = RedeemRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reward redeemed", body = RedeemRewardResponse),
        (status = 400, description = "Insufficient points or reward unavailable")
    )
)]
pub async fn redeem_reward(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<RedeemRewardRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.redeem(user.id, request.reward_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/rewards/{id}/use",
    tag = "loyalty",
    params(
        ("id" = i64, Path, description = "User reward ID")
    ),
    request_body = UseRewardRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Reward marked as used", body = UserRewardResponse),
        (status = 400, description = "Reward is not active")
    )
)]
pub async fn use_reward(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UseRewardRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service
        .use_reward(user.id, path.into_inner(), request.order_id)
        .await
    {
        Ok(reward) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": reward
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/summary",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Balance, tier, recent activity and rewards", body = LoyaltySummaryResponse)
    )
)]
pub async fn get_summary(loyalty_service: web::Data<LoyaltyService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.summary(user.id).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": summary
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/referral",
    tag = "loyalty",
    request_body = ProcessReferralRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Referral recorded"),
        (status = 400, description = "Unknown or own referral code"),
        (status = 409, description = "Already referred")
    )
)]
pub async fn process_referral(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
    request: web::Json<ProcessReferralRequest>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service
        .process_referral(user.id, &request.referral_code)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Referral recorded"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/loyalty/card",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's loyalty card, created on first request", body = MyLoyaltyCardResponse)
    )
)]
pub async fn my_card(loyalty_service: web::Data<LoyaltyService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.my_card(user.id).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/card/regenerate-qr",
    tag = "loyalty",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Card with a fresh QR code", body = LoyaltyCardResponse),
        (status = 404, description = "No card yet")
    )
)]
pub async fn regenerate_qr_code(
    loyalty_service: web::Data<LoyaltyService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match loyalty_service.regenerate_qr_code(user.id).await {
        Ok(card) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": card
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/loyalty/scan",
    tag = "loyalty",
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

pub fn loyalty_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/loyalty")
            .route("/points", web::get().to(get_points))
            .route("/points/history", web::get().to(get_points_history))
            .route("/points/preview", web::post().to(preview_points))
            .route("/rewards", web::get().to(list_rewards))
            .route("/rewards/mine", web::get().to(my_rewards))
            .route("/rewards/redeem", web::post().to(redeem_reward))
            .route("/rewards/{id}/use", web::post().to(use_reward))
            .route("/summary", web::get().to(get_summary))
            .route("/referral", web::post().to(process_referral))
            .route("/card", web::get().to(my_card))
            .route("/card/regenerate-qr", web::post().to(regenerate_qr_code))
            .route("/scan", web::post().to(scan_card)),
    );
}
