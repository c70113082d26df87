use crate::middlewares::{current_user, require_user};
use crate::models::*;
use crate::services::OrderService;
use crate::utils::pricing::DeliveryQuote;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Promo code or reward no longer usable")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user(&req).map(|u| u.id);

    match order_service.create(request.into_inner(), user_id).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(OrderQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The caller's orders, newest first", body = PaginatedResponse<OrderSummary>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match order_service.list_mine(user.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/calculate-totals",
    tag = "order",
    request_body = CalculateTotalsRequest,
    responses(
        (status = 200, description = "Priced quote, nothing is stored", body = OrderQuoteResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn calculate_totals(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    request: web::Json<CalculateTotalsRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user(&req).map(|u| u.id);

    match order_service.quote(&request, user_id).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/delivery-fee",
    tag = "order",
    request_body = DeliveryFeeRequest,
    responses(
        (status = 200, description = "Delivery fee for the destination", body = DeliveryQuote),
        (status = 400, description = "Outside the delivery zone")
    )
)]
pub async fn delivery_fee(
    order_service: web::Data<OrderService>,
    request: web::Json<DeliveryFeeRequest>,
) -> Result<HttpResponse> {
    match order_service.delivery_fee(&request).await {
        Ok(quote) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": quote
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/tracking/{order_number}",
    tag = "order",
    params(
        ("order_number" = String, Path, description = "Order number such as ORD-042")
    ),
    responses(
        (status = 200, description = "Public order progress", body = OrderTrackingResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn track_order(
    order_service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match order_service.tracking(&path).await {
        Ok(tracking) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": tracking
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order with its lines", body = OrderResponse),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match order_service
        .get(path.into_inner(), user.id, user.is_staff)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{id}/cancel",
    tag = "order",
    params(
        ("id" = i64, Path, description = "Order ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Order cancelled", body = OrderResponse),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = require_user(&req)?;

    match order_service
        .cancel(path.into_inner(), user.id, user.is_staff)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders))
            .route("/calculate-totals", web::post().to(calculate_totals))
            .route("/delivery-fee", web::post().to(delivery_fee))
            .route("/tracking/{order_number}", web::get().to(track_order))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}/cancel", web::post().to(cancel_order)),
    );
}
