use crate::middlewares::require_staff;
use crate::models::*;
use crate::services::SettingsService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/core/info",
    tag = "core",
    responses(
        (status = 200, description = "Public restaurant details", body = RestaurantInfo)
    )
)]
pub async fn get_info(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    match settings_service.info().await {
        Ok(info) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": info
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/core/settings",
    tag = "core",
    responses(
        (status = 200, description = "Restaurant settings", body = SettingsResponse)
    )
)]
pub async fn get_settings(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    match settings_service.settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/core/settings",
    tag = "core",
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
        Ok(settings) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": settings
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/core/health",
    tag = "core",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health() -> Result<HttpResponse> {
    let health = HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": health
    })))
}

#[utoipa::path(
    get,
    path = "/core/status",
    tag = "core",
    responses(
        (status = 200, description = "Database reachability and opening state", body = StatusResponse)
    )
)]
pub async fn status(settings_service: web::Data<SettingsService>) -> Result<HttpResponse> {
    let status = settings_service.status().await;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": status
    })))
}

#[utoipa::path(
    post,
    path = "/core/delivery-zone",
    tag = "core",
    request_body = DeliveryZoneRequest,
    responses(
        (status = 200, description = "Whether the point is inside the delivery radius", body = DeliveryZoneResponse)
    )
)]
pub async fn check_delivery_zone(
    settings_service: web::Data<SettingsService>,
    request: web::Json<DeliveryZoneRequest>,
) -> Result<HttpResponse> {
    match settings_service.check_delivery_zone(request.into_inner()).await {
        Ok(zone) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": zone
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn core_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/core")
            .route("/info", web::get().to(get_info))
            .route("/settings", web::get().to(get_settings))
            .route("/settings", web::put().to(update_settings))
            .route("/health", web::get().to(health))
            .route("/status", web::get().to(status))
            .route("/delivery-zone", web::post().to(check_delivery_zone)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_health_reports_version() {
        let app = test::init_service(App::new().configure(core_config)).await;
        let req = test::TestRequest::get().uri("/core/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
