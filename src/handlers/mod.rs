pub mod address;
pub mod admin;
pub mod auth;
pub mod loyalty;
pub mod menu;
pub mod order;
pub mod payment;
pub mod promotion;
pub mod restaurant;
pub mod user;
pub mod webhook;

pub use address::address_config;
pub use admin::admin_config;
pub use auth::auth_config;
pub use loyalty::loyalty_config;
pub use menu::menu_config;
pub use order::order_config;
pub use payment::payment_config;
pub use promotion::promotion_config;
pub use restaurant::core_config;
pub use user::user_config;
pub use webhook::webhook_config;
