use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{
    AddressType, DeliveryType, DiscountType, OrderPaymentStatus, OrderStatus, PaymentMethod,
    PaymentStatus, RewardType, SocialProvider, TransactionType, UserRewardStatus, VisitType,
};
use crate::external::GeocodeResult;
use crate::handlers;
use crate::models::*;
use crate::utils::points::{LoyaltyTier, TierBenefits};
use crate::utils::pricing::DeliveryQuote;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::address::list_addresses,
        handlers::address::create_address,
        handlers::address::get_default_address,
        handlers::address::geocode,
        handlers::address::reverse_geocode,
        handlers::address::get_address,
        handlers::address::update_address,
        handlers::address::delete_address,
        handlers::address::set_default_address,
        handlers::admin::dashboard,
        handlers::admin::list_orders,
        handlers::admin::update_order_status,
        handlers::admin::list_categories,
        handlers::admin::create_category,
        handlers::admin::update_category,
        handlers::admin::delete_category,
        handlers::admin::list_items,
        handlers::admin::create_item,
        handlers::admin::update_item,
        handlers::admin::delete_item,
        handlers::admin::toggle_item_availability,
        handlers::admin::toggle_item_featured,
        handlers::admin::list_rewards,
        handlers::admin::create_reward,
        handlers::admin::update_reward,
        handlers::admin::delete_reward,
        handlers::admin::list_promotions,
        handlers::admin::create_promotion,
        handlers::admin::update_promotion,
        handlers::admin::delete_promotion,
        handlers::admin::list_cards,
        handlers::admin::generate_cards,
        handlers::admin::get_card,
        handlers::admin::link_card,
        handlers::admin::unlink_card,
        handlers::admin::activate_card,
        handlers::admin::deactivate_card,
        handlers::admin::scan_dashboard,
        handlers::admin::get_settings,
        handlers::admin::update_settings,
        handlers::admin::list_users,
        handlers::admin::set_staff,
        handlers::admin::scan_card,
        handlers::admin::upload_image,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::social_login,
        handlers::auth::google_oauth_url,
        handlers::auth::google_callback,
        handlers::restaurant::get_info,
        handlers::restaurant::get_settings,
        handlers::restaurant::update_settings,
        handlers::restaurant::health,
        handlers::restaurant::status,
        handlers::restaurant::check_delivery_zone,
        handlers::loyalty::get_points,
        handlers::loyalty::get_points_history,
        handlers::loyalty::preview_points,
        handlers::loyalty::list_rewards,
        handlers::loyalty::my_rewards,
        handlers::loyalty::redeem_reward,
        handlers::loyalty::use_reward,
        handlers::loyalty::get_summary,
        handlers::loyalty::process_referral,
        handlers::loyalty::my_card,
        handlers::loyalty::regenerate_qr_code,
        handlers::loyalty::scan_card,
        handlers::menu::list_categories,
        handlers::menu::get_category,
        handlers::menu::category_items,
        handlers::menu::list_items,
        handlers::menu::featured_items,
        handlers::menu::get_item,
        handlers::menu::search,
        handlers::order::create_order,
        handlers::order::list_orders,
        handlers::order::calculate_totals,
        handlers::order::delivery_fee,
        handlers::order::track_order,
        handlers::order::get_order,
        handlers::order::cancel_order,
        handlers::payment::initialize_payment,
        handlers::payment::verify_payment,
        handlers::payment::payment_callback,
        handlers::promotion::active_promotions,
        handlers::promotion::get_promotion,
        handlers::promotion::validate_promotion,
        handlers::promotion::usage_history,
        handlers::promotion::apply_promotion,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::change_password,
        handlers::user::get_referrals,
    ),
    components(
        schemas(
            CreateAddressRequest,
            UpdateAddressRequest,
            AddressResponse,
            GeocodeRequest,
            ReverseGeocodeRequest,
            GeocodeResponse,
            DashboardStats,
            AdminUserResponse,
            SetStaffRequest,
            UploadResponse,
            PointsBalanceResponse,
            PointsTransactionResponse,
            PointsPreviewRequest,
            PointsPreviewResponse,
            RewardResponse,
            UserRewardResponse,
            RedeemRewardRequest,
            RedeemRewardResponse,
            UseRewardRequest,
            ProcessReferralRequest,
            LoyaltySummaryResponse,
            ScanCardRequest,
            ScanCardResponse,
            LoyaltyCardResponse,
            MyLoyaltyCardResponse,
            GenerateCardsRequest,
            LinkCardRequest,
            ScanRecord,
            ScanDashboardResponse,
            CreateRewardRequest,
            UpdateRewardRequest,
            CategoryResponse,
            MenuItemResponse,
            CategoryDetailResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CreateMenuItemRequest,
            UpdateMenuItemRequest,
            OrderItemRequest,
            CreateOrderRequest,
            CalculateTotalsRequest,
            DeliveryFeeRequest,
            QuotedLine,
            OrderQuoteResponse,
            OrderItemResponse,
            OrderResponse,
            OrderSummary,
            UpdateOrderStatusRequest,
            OrderTrackingResponse,
            InitializePaymentRequest,
            InitializePaymentResponse,
            PaymentResponse,
            VerifyPaymentResponse,
            PromoCodeResponse,
            ValidatePromoRequest,
            ValidatePromoResponse,
            ApplyPromoRequest,
            PromoUsageResponse,
            CreatePromoCodeRequest,
            UpdatePromoCodeRequest,
            RestaurantInfo,
            SettingsResponse,
            UpdateSettingsRequest,
            HealthResponse,
            StatusResponse,
            DeliveryZoneRequest,
            DeliveryZoneResponse,
            RegisterRequest,
            LoginRequest,
            SocialLoginRequest,
            GoogleCallbackRequest,
            OAuthUrlResponse,
            UserResponse,
            AuthResponse,
            RefreshTokenResponse,
            UpdateProfileRequest,
            ChangePasswordRequest,
            ReferredUser,
            ReferralSummary,
            AddressType,
            VisitType,
            OrderStatus,
            OrderPaymentStatus,
            DeliveryType,
            PaymentMethod,
            PaymentStatus,
            TransactionType,
            DiscountType,
            RewardType,
            SocialProvider,
            UserRewardStatus,
            LoyaltyTier,
            TierBenefits,
            DeliveryQuote,
            GeocodeResult,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sign-up, sign-in and tokens"),
        (name = "user", description = "Profile and referrals"),
        (name = "address", description = "Delivery addresses and geocoding"),
        (name = "core", description = "Restaurant settings and health"),
        (name = "menu", description = "Public menu"),
        (name = "order", description = "Ordering and tracking"),
        (name = "payment", description = "Paystack payments"),
        (name = "loyalty", description = "Points, rewards and loyalty cards"),
        (name = "promotion", description = "Promo codes"),
        (name = "admin", description = "Staff console"),
    ),
    info(
        title = "Chopsticks Backend API",
        version = "1.0.0",
        description = "Chopsticks restaurant REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_scope() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/menu/items",
            "/orders",
            "/payments/initialize",
            "/loyalty/points",
            "/promotions/{code}",
            "/admin/uploads",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
