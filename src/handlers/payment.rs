use crate::middlewares::current_user;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payments/initialize",
    tag = "payment",
    request_body = InitializePaymentRequest,
    responses(
        (status = 200, description = "Paystack checkout created", body = InitializePaymentResponse),
        (status = 400, description = "Order cannot be paid online"),
        (status = 404, description = "Order not found"),
        (status = 502, description = "Paystack rejected the request")
    )
)]
pub async fn initialize_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<InitializePaymentRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user(&req).map(|u| u.id);

    match payment_service.initialize(request.into_inner(), user_id).await {
        Ok(checkout) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": checkout
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/verify/{reference}",
    tag = "payment",
    params(
        ("reference" = String, Path, description = "Payment reference")
    ),
    responses(
        (status = 200, description = "Payment state after checking with Paystack", body = VerifyPaymentResponse),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn verify_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match payment_service.verify(&path).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/callback",
    tag = "payment",
    params(PaymentCallbackQuery),
    responses(
        (status = 200, description = "Payment state after checking with Paystack", body = VerifyPaymentResponse),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn payment_callback(
    payment_service: web::Data<PaymentService>,
    query: web::Query<PaymentCallbackQuery>,
) -> Result<HttpResponse> {
    match payment_service.verify(&query.reference).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("/initialize", web::post().to(initialize_payment))
            .route("/verify/{reference}", web::get().to(verify_payment))
            .route("/callback", web::get().to(payment_callback)),
    );
}
