pub mod addresses;
pub mod card_scans;
pub mod categories;
pub mod loyalty_cards;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod points_transactions;
pub mod promo_code_usages;
pub mod promo_codes;
pub mod restaurant_settings;
pub mod rewards;
pub mod social_accounts;
pub mod user_points;
pub mod user_rewards;
pub mod users;

pub use addresses as address_entity;
pub use card_scans as card_scan_entity;
pub use categories as category_entity;
pub use loyalty_cards as loyalty_card_entity;
pub use menu_items as menu_item_entity;
pub use order_items as order_item_entity;
pub use orders as order_entity;
pub use payments as payment_entity;
pub use points_transactions as points_transaction_entity;
pub use promo_code_usages as promo_code_usage_entity;
pub use promo_codes as promo_code_entity;
pub use restaurant_settings as settings_entity;
pub use rewards as reward_entity;
pub use social_accounts as social_account_entity;
pub use user_points as user_points_entity;
pub use user_rewards as user_reward_entity;
pub use users as user_entity;

pub use addresses::AddressType;
pub use card_scans::VisitType;
pub use orders::{DeliveryType, OrderPaymentStatus, OrderStatus, PaymentMethod};
pub use payments::PaymentStatus;
pub use points_transactions::TransactionType;
pub use promo_codes::{DiscountType, PromoRejection};
pub use rewards::RewardType;
pub use social_accounts::SocialProvider;
pub use user_rewards::UserRewardStatus;
