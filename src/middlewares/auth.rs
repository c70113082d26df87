use crate::error::{AppError, AppResult};
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Authenticated caller, stored in request extensions by `AuthMiddleware`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub is_staff: bool,
}

struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/v1/orders",
            ],
            // Guest-or-user endpoints; handlers that need an identity check it themselves
            prefix_paths: vec![
                "/swagger-ui/",
                "/api-docs/",
                "/api/v1/auth/",
                "/webhook/",
                "/api/v1/core/",
                "/api/v1/menu",
                "/api/v1/orders/",
                "/api/v1/payments/",
                "/api/v1/promotions/",
            ],
            // The refresh endpoint stays public: it checks the refresh token itself
            excluded_paths: vec![
                "/api/v1/auth/logout",
                "/api/v1/promotions/usage",
                "/api/v1/promotions/apply",
            ],
        }
    }

    fn is_public_path(&self, path: &str) -> bool {
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }

        if self.exact_paths.contains(&path) {
            return true;
        }

        self.prefix_paths
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

fn bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.method() == Method::OPTIONS {
            let fut = self.service.call(req);
            return Box::pin(fut);
        }

        let is_public = self.public_paths.is_public_path(req.path());
        let token = bearer_token(&req);

        let verified = token.as_deref().map(|t| {
            self.jwt_service
                .verify_access_token(t)
                .and_then(|claims| {
                    Ok(AuthUser {
                        id: claims.user_id()?,
                        is_staff: claims.is_staff,
                    })
                })
        });

        match (verified, is_public) {
            (Some(Ok(user)), _) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            // Guests on public paths, including ones sending a stale token
            (_, true) => {
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            (Some(Err(_)), false) => {
                let error = AppError::AuthError("Invalid access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            (None, false) => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// Caller attached by the middleware, if any
pub fn current_user(req: &HttpRequest) -> Option<AuthUser> {
    req.extensions().get::<AuthUser>().copied()
}

pub fn require_user(req: &HttpRequest) -> AppResult<AuthUser> {
    current_user(req).ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

pub fn require_staff(req: &HttpRequest) -> AppResult<AuthUser> {
    let user = require_user(req)?;
    if !user.is_staff {
        return Err(AppError::PermissionDenied);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    #[::core::prelude::v1::test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public_path("/api/v1/auth/login"));
        assert!(paths.is_public_path("/api/v1/auth/refresh"));
        assert!(!paths.is_public_path("/api/v1/auth/logout"));
        assert!(paths.is_public_path("/api/v1/menu/items"));
        assert!(paths.is_public_path("/api/v1/orders"));
        assert!(paths.is_public_path("/api/v1/orders/tracking/ORD-001"));
        assert!(paths.is_public_path("/webhook/paystack"));
        assert!(paths.is_public_path("/api/v1/core/info"));
        assert!(!paths.is_public_path("/api/v1/users/me"));
        assert!(!paths.is_public_path("/api/v1/loyalty/points"));
        assert!(!paths.is_public_path("/api/v1/admin/orders"));
        assert!(!paths.is_public_path("/api/v1/promotions/apply/4"));
    }

    async fn whoami(req: HttpRequest) -> HttpResponse {
        match current_user(&req) {
            Some(u) => HttpResponse::Ok().body(format!("{}:{}", u.id, u.is_staff)),
            None => HttpResponse::Ok().body("guest"),
        }
    }

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600, 7200)
    }

    #[actix_web::test]
    async fn test_protected_path_requires_token() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/users/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/v1/users/me").to_request();
        let resp = test::try_call_service(&app, req).await;
        let err = resp.err().unwrap();
        assert_eq!(err.as_response_error().status_code(), 401);
    }

    #[actix_web::test]
    async fn test_token_attaches_user() {
        let svc = jwt();
        let token = svc.generate_access_token(42, "ada@example.com", true).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(svc))
                .route("/api/v1/users/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"42:true");
    }

    #[actix_web::test]
    async fn test_public_path_allows_guest_with_stale_token() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt()))
                .route("/api/v1/orders", web::post().to(whoami)),
        )
        .await;
        let req = test::TestRequest::post()
            .uri("/api/v1/orders")
            .insert_header(("Authorization", "Bearer not-a-token"))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(&body[..], b"guest");
    }

    #[actix_web::test]
    async fn test_refresh_token_rejected_as_access() {
        let svc = jwt();
        let token = svc.generate_refresh_token(7, "ada@example.com", false).unwrap();
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(svc))
                .route("/api/v1/users/me", web::get().to(whoami)),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        assert!(test::try_call_service(&app, req).await.is_err());
    }
}
