pub mod address_service;
pub mod admin_service;
pub mod auth_service;
pub mod loyalty_service;
pub mod menu_service;
pub mod order_service;
pub mod payment_service;
pub mod promotion_service;
pub mod settings_service;
pub mod upload_service;
pub mod user_service;

pub use address_service::AddressService;
pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use loyalty_service::LoyaltyService;
pub use menu_service::MenuService;
pub use order_service::OrderService;
pub use payment_service::PaymentService;
pub use promotion_service::PromotionService;
pub use settings_service::SettingsService;
pub use upload_service::UploadService;
pub use user_service::UserService;
