use crate::entities::{
    RewardType, TransactionType, UserRewardStatus, VisitType, loyalty_card_entity,
    points_transaction_entity, reward_entity, user_points_entity, user_reward_entity,
};
use crate::utils::points::{LoyaltyTier, OrderPoints, TierBenefits};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsBalanceResponse {
    pub balance: i64,
    pub total_earned: i64,
    pub total_spent: i64,
    pub tier: LoyaltyTier,
    pub updated_at: DateTime<Utc>,
}

impl PointsBalanceResponse {
    pub fn new(p: user_points_entity::Model, tier: LoyaltyTier) -> Self {
        Self {
            balance: p.balance,
            total_earned: p.total_earned,
            total_spent: p.total_spent,
            tier,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsTransactionResponse {
    pub id: i64,
    pub amount: i64,
    pub transaction_type: TransactionType,
    pub reason: String,
    pub balance_after: i64,
    pub order_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<points_transaction_entity::Model> for PointsTransactionResponse {
    fn from(t: points_transaction_entity::Model) -> Self {
        Self {
            id: t.id,
            amount: t.amount,
            transaction_type: t.transaction_type,
            reason: t.reason,
            balance_after: t.balance_after,
            order_id: t.order_id,
            created_at: t.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsPreviewRequest {
    /// Order subtotal in kobo
    pub order_amount: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsPreviewResponse {
    #[serde(flatten)]
    pub points: OrderPoints,
    pub is_first_order: bool,
    pub is_birthday: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RewardResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub reward_type: RewardType,
    pub points_required: i64,
    pub discount_percentage_bp: Option<i32>,
    pub discount_amount: Option<i64>,
    pub free_item_id: Option<i64>,
    pub is_active: bool,
    pub max_redemptions: i32,
    pub current_redemptions: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_available: bool,
    /// Filled for signed-in callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_afford: Option<bool>,
}

impl RewardResponse {
    pub fn new(r: reward_entity::Model, now: DateTime<Utc>, balance: Option<i64>) -> Self {
        let is_available = r.is_available_at(now);
        let can_afford = balance.map(|b| b >= r.points_required);
        Self {
            id: r.id,
            name: r.name,
            description: r.description,
            reward_type: r.reward_type,
            points_required: r.points_required,
            discount_percentage_bp: r.discount_percentage_bp,
            discount_amount: r.discount_amount,
            free_item_id: r.free_item_id,
            is_active: r.is_active,
            max_redemptions: r.max_redemptions,
            current_redemptions: r.current_redemptions,
            valid_from: r.valid_from,
            valid_until: r.valid_until,
            is_available,
            can_afford,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserRewardResponse {
    pub id: i64,
    pub reward_id: i64,
    pub reward_name: String,
    pub reward_type: RewardType,
    pub points_spent: i64,
    pub status: UserRewardStatus,
    pub redeemed_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub order_id: Option<i64>,
}

impl UserRewardResponse {
    pub fn new(ur: user_reward_entity::Model, reward: &reward_entity::Model) -> Self {
        Self {
            id: ur.id,
            reward_id: ur.reward_id,
            reward_name: reward.name.clone(),
            reward_type: reward.reward_type.clone(),
            points_spent: ur.points_spent,
            status: ur.status,
            redeemed_at: ur.redeemed_at,
            used_at: ur.used_at,
            expires_at: ur.expires_at,
            order_id: ur.order_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserRewardQuery {
    pub status: Option<UserRewardStatus>,
    pub reward_type: Option<RewardType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemRewardRequest {
    pub reward_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemRewardResponse {
    pub user_reward: UserRewardResponse,
    pub remaining_points: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UseRewardRequest {
    pub order_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProcessReferralRequest {
    pub referral_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoyaltySummaryResponse {
    pub points: PointsBalanceResponse,
    pub tier_benefits: TierBenefits,
    pub recent_transactions: Vec<PointsTransactionResponse>,
    pub active_rewards: Vec<UserRewardResponse>,
    pub redeemable_rewards_count: usize,
    pub referral_code: String,
    pub referrals_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanCardRequest {
    /// Raw scanner payload
    #[schema(example = "LOYALTY:LOYALTY-3F9A1C0B7D2E")]
    pub qr_code: String,
    #[serde(default)]
    pub visit_type: VisitType,
    /// Bill amount in kobo
    #[serde(default)]
    pub visit_amount: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanCardResponse {
    pub card_id: i64,
    pub qr_code: String,
    pub user_id: Option<i64>,
    pub customer_name: Option<String>,
    pub points_awarded: i64,
    pub new_balance: Option<i64>,
    pub scan_time: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoyaltyCardResponse {
    pub id: i64,
    pub qr_code: String,
    /// Text to render into the QR image
    pub qr_payload: String,
    pub user_id: Option<i64>,
    pub is_active: bool,
    pub last_scan: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<loyalty_card_entity::Model> for LoyaltyCardResponse {
    fn from(c: loyalty_card_entity::Model) -> Self {
        let qr_payload = crate::utils::qr::card_qr_payload(&c.qr_code);
        Self {
            id: c.id,
            qr_code: c.qr_code,
            qr_payload,
            user_id: c.user_id,
            is_active: c.is_active,
            last_scan: c.last_scan,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MyLoyaltyCardResponse {
    pub card: LoyaltyCardResponse,
    pub points_balance: i64,
    pub total_earned: i64,
    pub tier: LoyaltyTier,
    pub tier_benefits: TierBenefits,
    pub next_tier: Option<LoyaltyTier>,
    pub points_to_next_tier: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GenerateCardsRequest {
    #[schema(example = 10)]
    pub count: u32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinkCardRequest {
    pub user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanRecord {
    pub id: i64,
    pub card_id: i64,
    pub user_id: Option<i64>,
    pub visit_type: VisitType,
    pub visit_amount: i64,
    pub points_awarded: i64,
    pub scanned_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entities::card_scan_entity::Model> for ScanRecord {
    fn from(s: crate::entities::card_scan_entity::Model) -> Self {
        Self {
            id: s.id,
            card_id: s.card_id,
            user_id: s.user_id,
            visit_type: s.visit_type,
            visit_amount: s.visit_amount,
            points_awarded: s.points_awarded,
            scanned_by: s.scanned_by,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanDashboardResponse {
    pub total_cards: u64,
    pub active_cards: u64,
    pub assigned_cards: u64,
    pub today_scans: u64,
    pub recent_scans: Vec<ScanRecord>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CardListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub is_active: Option<bool>,
    pub assigned: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateRewardRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub reward_type: RewardType,
    pub points_required: i64,
    pub discount_percentage_bp: Option<i32>,
    pub discount_amount: Option<i64>,
    pub free_item_id: Option<i64>,
    pub is_active: Option<bool>,
    pub max_redemptions: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRewardRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub reward_type: Option<RewardType>,
    pub points_required: Option<i64>,
    pub discount_percentage_bp: Option<i32>,
    pub discount_amount: Option<i64>,
    pub free_item_id: Option<i64>,
    pub is_active: Option<bool>,
    pub max_redemptions: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}
