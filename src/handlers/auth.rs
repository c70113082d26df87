use crate::error::AppError;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Wrong email or password")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "New token pair", body = RefreshTokenResponse),
        (status = 401, description = "Invalid refresh token")
    )
)]
pub async fn refresh(auth_service: web::Data<AuthService>, req: HttpRequest) -> Result<HttpResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return Ok(AppError::AuthError("Missing refresh token".to_string()).error_response());
    };

    match auth_service.refresh_token(token).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Signed out")
    )
)]
pub async fn logout() -> Result<HttpResponse> {
    // Tokens are stateless; the client drops them.
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out"
    })))
}

#[utoipa::path(
    post,
    path = "/auth/social",
    tag = "auth",
    request_body = SocialLoginRequest,
    responses(
        (status = 200, description = "Signed in with a social account", body = AuthResponse),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Provider rejected the token")
    )
)]
pub async fn social_login(
    auth_service: web::Data<AuthService>,
    request: web::Json<SocialLoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.social_login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/auth/google/oauth-url",
    tag = "auth",
    responses(
        (status = 200, description = "Google authorization URL", body = OAuthUrlResponse),
        (status = 500, description = "Google sign-in is not configured")
    )
)]
pub async fn google_oauth_url(auth_service: web::Data<AuthService>) -> Result<HttpResponse> {
    match auth_service.google_oauth_url() {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/google/callback",
    tag = "auth",
    request_body = GoogleCallbackRequest,
    responses(
        (status = 200, description = "Signed in with Google", body = AuthResponse),
        (status = 401, description = "Code exchange failed")
    )
)]
pub async fn google_callback(
    auth_service: web::Data<AuthService>,
    request: web::Json<GoogleCallbackRequest>,
) -> Result<HttpResponse> {
    match auth_service.google_callback(&request.code).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/social", web::post().to(social_login))
            .route("/google/oauth-url", web::get().to(google_oauth_url))
            .route("/google/callback", web::post().to(google_callback)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GoogleConfig;
    use crate::external::GoogleOAuthService;
    use crate::utils::JwtService;
    use actix_web::{App, test};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn auth_service() -> AuthService {
        AuthService::new(
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            JwtService::new("test-secret", 3600, 7200),
            GoogleOAuthService::new(GoogleConfig::default()),
        )
    }

    #[actix_web::test]
    async fn test_refresh_without_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth_service()))
                .configure(auth_config),
        )
        .await;
        let req = test::TestRequest::post().uri("/auth/refresh").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_refresh_rejects_access_token() {
        let jwt = JwtService::new("test-secret", 3600, 7200);
        let access = jwt.generate_access_token(5, "ada@example.com", false).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(auth_service()))
                .configure(auth_config),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .insert_header(("Authorization", format!("Bearer {access}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_logout_acknowledges() {
        let app = test::init_service(App::new().configure(auth_config)).await;
        let req = test::TestRequest::post().uri("/auth/logout").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
    }
}
