use crate::config::LoyaltyConfig;
use crate::database::DbPool;
use crate::entities::{
    OrderPaymentStatus, TransactionType, UserRewardStatus, card_scan_entity as scans,
    loyalty_card_entity as cards, order_entity as orders, points_transaction_entity as ledger,
    reward_entity as rewards, user_entity as users, user_points_entity as up,
    user_reward_entity as ur,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::dates::{end_of_local_day, start_of_local_day, today_local};
use crate::utils::points::{LoyaltyTier, order_points, visit_points};
use crate::utils::qr::extract_card_code;
use crate::utils::{ValidationErrors, generate_loyalty_qr_code, is_valid_referral_code};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

const MAX_CARDS_PER_BATCH: u32 = 100;

// Ledger primitives. They take any connection so callers can run them inside
// their own transaction.

/// Points account of the user, created empty on first use.
pub async fn ensure_points_account<C: ConnectionTrait>(db: &C, user_id: i64) -> AppResult<up::Model> {
    if let Some(account) = up::Entity::find()
        .filter(up::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(account);
    }
    up::Entity::insert(up::ActiveModel {
        user_id: Set(user_id),
        balance: Set(0),
        total_earned: Set(0),
        total_spent: Set(0),
        ..Default::default()
    })
    .on_conflict(OnConflict::column(up::Column::UserId).do_nothing().to_owned())
    .exec_without_returning(db)
    .await?;
    up::Entity::find()
        .filter(up::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::InternalError("Points account missing".into()))
}

/// One ledger row. `related_user_id` names the other party of a referral bonus.
struct LedgerEntry {
    user_id: i64,
    amount: i64,
    transaction_type: TransactionType,
    reason: String,
    order_id: Option<i64>,
    related_user_id: Option<i64>,
}

async fn record_entry<C: ConnectionTrait>(db: &C, entry: LedgerEntry) -> AppResult<i64> {
    let account = up::Entity::find()
        .filter(up::Column::UserId.eq(entry.user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::InternalError("Points account missing".into()))?;
    ledger::ActiveModel {
        user_id: Set(entry.user_id),
        amount: Set(entry.amount),
        transaction_type: Set(entry.transaction_type),
        reason: Set(entry.reason),
        balance_after: Set(account.balance),
        order_id: Set(entry.order_id),
        related_user_id: Set(entry.related_user_id),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(account.balance)
}

async fn apply_credit<C: ConnectionTrait>(db: &C, entry: LedgerEntry) -> AppResult<i64> {
    let (user_id, amount) = (entry.user_id, entry.amount);
    if amount <= 0 {
        return Err(AppError::ValidationError("Points amount must be positive".into()));
    }
    ensure_points_account(db, user_id).await?;
    up::Entity::update_many()
        .col_expr(up::Column::Balance, Expr::col(up::Column::Balance).add(amount))
        .col_expr(up::Column::TotalEarned, Expr::col(up::Column::TotalEarned).add(amount))
        .col_expr(up::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(up::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    log::info!(
        "Points credited: user={user_id} amount={amount} type={}",
        entry.transaction_type
    );
    record_entry(db, entry).await
}

/// Add points and write the ledger entry. Returns the new balance.
pub async fn credit_points<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    transaction_type: TransactionType,
    reason: impl Into<String>,
    order_id: Option<i64>,
) -> AppResult<i64> {
    apply_credit(
        db,
        LedgerEntry {
            user_id,
            amount,
            transaction_type,
            reason: reason.into(),
            order_id,
            related_user_id: None,
        },
    )
    .await
}

/// Remove points if the balance covers them. Returns the new balance.
pub async fn debit_points<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    amount: i64,
    transaction_type: TransactionType,
    reason: impl Into<String>,
    order_id: Option<i64>,
) -> AppResult<i64> {
    if amount <= 0 {
        return Err(AppError::ValidationError("Points amount must be positive".into()));
    }
    ensure_points_account(db, user_id).await?;
    let res = up::Entity::update_many()
        .col_expr(up::Column::Balance, Expr::col(up::Column::Balance).sub(amount))
        .col_expr(up::Column::TotalSpent, Expr::col(up::Column::TotalSpent).add(amount))
        .col_expr(up::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(up::Column::UserId.eq(user_id))
        .filter(up::Column::Balance.gte(amount))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::ValidationError("Insufficient points".into()));
    }
    record_entry(
        db,
        LedgerEntry {
            user_id,
            amount: -amount,
            transaction_type,
            reason: reason.into(),
            order_id,
            related_user_id: None,
        },
    )
    .await
}

/// Pay out the referral bonus for `user` and whoever referred them, once.
/// Only a bonus `user` received from `referrer` counts as already paid; bonuses
/// `user` earned by referring others do not.
async fn grant_referral_bonus<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    referrer: &users::Model,
    cfg: &LoyaltyConfig,
) -> AppResult<bool> {
    let already = ledger::Entity::find()
        .filter(ledger::Column::UserId.eq(user.id))
        .filter(ledger::Column::TransactionType.eq(TransactionType::Referral))
        .filter(ledger::Column::RelatedUserId.eq(referrer.id))
        .count(db)
        .await?;
    if already > 0 || cfg.referral_bonus <= 0 {
        return Ok(false);
    }
    apply_credit(
        db,
        LedgerEntry {
            user_id: user.id,
            amount: cfg.referral_bonus,
            transaction_type: TransactionType::Referral,
            reason: format!("Referral bonus from {}", referrer.referral_code),
            order_id: None,
            related_user_id: Some(referrer.id),
        },
    )
    .await?;
    apply_credit(
        db,
        LedgerEntry {
            user_id: referrer.id,
            amount: cfg.referral_bonus,
            transaction_type: TransactionType::Referral,
            reason: format!("Referral bonus for {}", user.referral_code),
            order_id: None,
            related_user_id: Some(user.id),
        },
    )
    .await?;
    log::info!("Referral bonus granted: user={} referrer={}", user.id, referrer.id);
    Ok(true)
}

/// Credit the loyalty points of a paid order, at most once per order.
/// Guest orders earn nothing. Returns the points credited.
pub async fn award_order_points<C: ConnectionTrait>(
    db: &C,
    order: &orders::Model,
    cfg: &LoyaltyConfig,
) -> AppResult<i64> {
    let Some(user_id) = order.user_id else {
        return Ok(0);
    };
    let claimed = orders::Entity::update_many()
        .col_expr(orders::Column::PointsAwarded, Expr::value(true))
        .filter(orders::Column::Id.eq(order.id))
        .filter(orders::Column::PointsAwarded.eq(false))
        .exec(db)
        .await?;
    if claimed.rows_affected == 0 {
        return Ok(0);
    }

    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    let earlier_paid = orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .filter(orders::Column::PaymentStatus.eq(OrderPaymentStatus::Paid))
        .filter(orders::Column::Id.ne(order.id))
        .count(db)
        .await?;
    let is_first_order = earlier_paid == 0;
    let is_birthday = user.is_birthday_on(today_local());
    let points = order_points(order.subtotal, is_first_order, is_birthday, cfg);

    let number = &order.order_number;
    if points.base_points > 0 {
        credit_points(
            db,
            user_id,
            points.base_points,
            TransactionType::Earned,
            format!("Order {number}"),
            Some(order.id),
        )
        .await?;
    }
    if points.first_order_bonus > 0 {
        credit_points(
            db,
            user_id,
            points.first_order_bonus,
            TransactionType::FirstOrder,
            format!("First order bonus ({number})"),
            Some(order.id),
        )
        .await?;
    }
    if points.birthday_bonus > 0 {
        credit_points(
            db,
            user_id,
            points.birthday_bonus,
            TransactionType::Birthday,
            format!("Birthday bonus ({number})"),
            Some(order.id),
        )
        .await?;
    }

    if is_first_order {
        if let Some(referrer_id) = user.referred_by {
            if let Some(referrer) = users::Entity::find_by_id(referrer_id).one(db).await? {
                grant_referral_bonus(db, &user, &referrer, cfg).await?;
            }
        }
    }

    log::info!(
        "Order points awarded: order={} user={} points={}",
        order.order_number,
        user_id,
        points.total_points
    );
    Ok(points.total_points)
}

/// Active, unexpired reward redemption owned by `user_id`, with its catalog entry.
pub async fn usable_user_reward<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    user_reward_id: i64,
    now: DateTime<Utc>,
) -> AppResult<(ur::Model, rewards::Model)> {
    let user_reward = ur::Entity::find_by_id(user_reward_id)
        .filter(ur::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reward not found".into()))?;
    if !user_reward.is_usable_at(now) {
        return Err(AppError::field(
            "user_reward_id",
            "Reward is not available for use",
        ));
    }
    let reward = rewards::Entity::find_by_id(user_reward.reward_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Reward not found".into()))?;
    Ok((user_reward, reward))
}

/// Flip an active redemption to used. Fails when it was used concurrently.
pub async fn mark_reward_used<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
    user_reward_id: i64,
    order_id: Option<i64>,
    now: DateTime<Utc>,
) -> AppResult<()> {
    let res = ur::Entity::update_many()
        .col_expr(ur::Column::Status, UserRewardStatus::Used.as_enum())
        .col_expr(ur::Column::UsedAt, Expr::value(Some(now)))
        .col_expr(ur::Column::OrderId, Expr::value(order_id))
        .filter(ur::Column::Id.eq(user_reward_id))
        .filter(ur::Column::UserId.eq(user_id))
        .filter(ur::Column::Status.eq(UserRewardStatus::Active))
        .filter(
            Condition::any()
                .add(ur::Column::ExpiresAt.is_null())
                .add(ur::Column::ExpiresAt.gt(now)),
        )
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(AppError::field(
            "user_reward_id",
            "Reward is not available for use",
        ));
    }
    Ok(())
}

async fn expire_stale_rewards<C: ConnectionTrait>(db: &C, user_id: Option<i64>) -> AppResult<u64> {
    let mut update = ur::Entity::update_many()
        .col_expr(ur::Column::Status, UserRewardStatus::Expired.as_enum())
        .filter(ur::Column::Status.eq(UserRewardStatus::Active))
        .filter(ur::Column::ExpiresAt.lte(Utc::now()));
    if let Some(user_id) = user_id {
        update = update.filter(ur::Column::UserId.eq(user_id));
    }
    Ok(update.exec(db).await?.rows_affected)
}

pub fn validate_reward_fields(
    reward_type: &crate::entities::RewardType,
    points_required: i64,
    discount_percentage_bp: Option<i32>,
    discount_amount: Option<i64>,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
) -> AppResult<()> {
    use crate::entities::RewardType;
    let mut errors = ValidationErrors::new();
    errors.check(points_required > 0, "points_required", "Points required must be positive");
    if let Some(bp) = discount_percentage_bp {
        errors.check(
            (0..=10_000).contains(&bp),
            "discount_percentage_bp",
            "Percentage must be between 0 and 10000 basis points",
        );
    }
    if let Some(amount) = discount_amount {
        errors.check(amount >= 0, "discount_amount", "Amount cannot be negative");
    }
    match reward_type {
        RewardType::Discount => errors.check(
            discount_percentage_bp.is_some_and(|bp| bp > 0) || discount_amount.is_some_and(|a| a > 0),
            "discount_percentage_bp",
            "Discount rewards need a percentage or an amount",
        ),
        RewardType::Cashback => errors.check(
            discount_amount.is_some_and(|a| a > 0),
            "discount_amount",
            "Cashback rewards need an amount",
        ),
        RewardType::FreeItem | RewardType::FreeDelivery => {}
    }
    if let (Some(from), Some(until)) = (valid_from, valid_until) {
        errors.check(until > from, "valid_until", "End must be after start");
    }
    errors.into_result()
}

#[derive(Clone)]
pub struct LoyaltyService {
    pool: DbPool,
    config: LoyaltyConfig,
}

impl LoyaltyService {
    pub fn new(pool: DbPool, config: LoyaltyConfig) -> Self {
        Self { pool, config }
    }

    fn tier_of(&self, account: &up::Model) -> LoyaltyTier {
        LoyaltyTier::for_total_earned(account.total_earned, &self.config)
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))
    }

    pub async fn balance(&self, user_id: i64) -> AppResult<PointsBalanceResponse> {
        let account = ensure_points_account(self.pool.as_ref(), user_id).await?;
        let tier = self.tier_of(&account);
        Ok(PointsBalanceResponse::new(account, tier))
    }

    pub async fn history(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PointsTransactionResponse>> {
        let paginator = ledger::Entity::find()
            .filter(ledger::Column::UserId.eq(user_id))
            .order_by_desc(ledger::Column::CreatedAt)
            .order_by_desc(ledger::Column::Id)
            .paginate(self.pool.as_ref(), params.page_size());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;
        Ok(PaginatedResponse::from_params(
            rows.into_iter().map(PointsTransactionResponse::from).collect(),
            params,
            total,
        ))
    }

    pub async fn preview(&self, user_id: i64, order_amount: i64) -> AppResult<PointsPreviewResponse> {
        if order_amount < 0 {
            return Err(AppError::field("order_amount", "Amount cannot be negative"));
        }
        let user = self.find_user(user_id).await?;
        let paid_orders = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::PaymentStatus.eq(OrderPaymentStatus::Paid))
            .count(self.pool.as_ref())
            .await?;
        let is_first_order = paid_orders == 0;
        let is_birthday = user.is_birthday_on(today_local());
        Ok(PointsPreviewResponse {
            points: order_points(order_amount, is_first_order, is_birthday, &self.config),
            is_first_order,
            is_birthday,
        })
    }

    pub async fn available_rewards(&self, user_id: Option<i64>) -> AppResult<Vec<RewardResponse>> {
        let now = Utc::now();
        let balance = match user_id {
            Some(id) => Some(ensure_points_account(self.pool.as_ref(), id).await?.balance),
            None => None,
        };
        let rows = rewards::Entity::find()
            .filter(rewards::Column::IsActive.eq(true))
            .order_by_asc(rewards::Column::PointsRequired)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .filter(|r| r.is_available_at(now))
            .map(|r| RewardResponse::new(r, now, balance))
            .collect())
    }

    async fn reward_catalog(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, rewards::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = rewards::Entity::find()
            .filter(rewards::Column::Id.is_in(ids))
            .all(self.pool.as_ref())
            .await?;
        Ok(rows.into_iter().map(|r| (r.id, r)).collect())
    }

    async fn to_user_reward_responses(&self, rows: Vec<ur::Model>) -> AppResult<Vec<UserRewardResponse>> {
        let catalog = self
            .reward_catalog(rows.iter().map(|r| r.reward_id).collect())
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let reward = catalog.get(&row.reward_id)?;
                Some(UserRewardResponse::new(row, reward))
            })
            .collect())
    }

    pub async fn my_rewards(&self, user_id: i64, query: &UserRewardQuery) -> AppResult<Vec<UserRewardResponse>> {
        let expired = expire_stale_rewards(self.pool.as_ref(), Some(user_id)).await?;
        if expired > 0 {
            log::info!("Expired {expired} rewards of user {user_id}");
        }
        let mut select = ur::Entity::find()
            .filter(ur::Column::UserId.eq(user_id))
            .order_by_desc(ur::Column::RedeemedAt);
        if let Some(status) = &query.status {
            select = select.filter(ur::Column::Status.eq(status.clone()));
        }
        if let Some(from) = query.date_from {
            select = select.filter(ur::Column::RedeemedAt.gte(start_of_local_day(from)));
        }
        if let Some(to) = query.date_to {
            select = select.filter(ur::Column::RedeemedAt.lt(end_of_local_day(to)));
        }
        let mut responses = self.to_user_reward_responses(select.all(self.pool.as_ref()).await?).await?;
        if let Some(reward_type) = &query.reward_type {
            responses.retain(|r| &r.reward_type == reward_type);
        }
        Ok(responses)
    }

    pub async fn redeem(&self, user_id: i64, reward_id: i64) -> AppResult<RedeemRewardResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let reward = rewards::Entity::find_by_id(reward_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Reward not found".into()))?;
        if !reward.is_available_at(now) {
            return Err(AppError::ValidationError("Reward is not available".into()));
        }
        let account = ensure_points_account(&txn, user_id).await?;
        if !account.can_afford(reward.points_required) {
            return Err(AppError::ValidationError(
                "Insufficient points to redeem this reward".into(),
            ));
        }

        let claimed = rewards::Entity::update_many()
            .col_expr(
                rewards::Column::CurrentRedemptions,
                Expr::col(rewards::Column::CurrentRedemptions).add(1),
            )
            .filter(rewards::Column::Id.eq(reward.id))
            .filter(rewards::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(rewards::Column::MaxRedemptions.eq(0))
                    .add(
                        Expr::col(rewards::Column::CurrentRedemptions)
                            .lt(Expr::col(rewards::Column::MaxRedemptions)),
                    ),
            )
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(AppError::ValidationError("Reward is no longer available".into()));
        }

        let remaining = debit_points(
            &txn,
            user_id,
            reward.points_required,
            TransactionType::Spent,
            format!("Redeemed: {}", reward.name),
            None,
        )
        .await?;

        let user_reward = ur::ActiveModel {
            user_id: Set(user_id),
            reward_id: Set(reward.id),
            points_spent: Set(reward.points_required),
            status: Set(UserRewardStatus::Active),
            redeemed_at: Set(now),
            expires_at: Set(Some(now + Duration::days(self.config.reward_validity_days))),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Reward redeemed: user={user_id} reward={} points={}",
            reward.id,
            reward.points_required
        );
        Ok(RedeemRewardResponse {
            user_reward: UserRewardResponse::new(user_reward, &reward),
            remaining_points: remaining,
        })
    }

    pub async fn use_reward(
        &self,
        user_id: i64,
        user_reward_id: i64,
        order_id: Option<i64>,
    ) -> AppResult<UserRewardResponse> {
        let now = Utc::now();
        let txn = self.pool.begin().await?;
        let (_, reward) = usable_user_reward(&txn, user_id, user_reward_id, now).await?;
        if let Some(order_id) = order_id {
            let owned = orders::Entity::find_by_id(order_id)
                .filter(orders::Column::UserId.eq(user_id))
                .count(&txn)
                .await?;
            if owned == 0 {
                return Err(AppError::NotFound("Order not found".into()));
            }
        }
        mark_reward_used(&txn, user_id, user_reward_id, order_id, now).await?;
        let updated = ur::Entity::find_by_id(user_reward_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Reward not found".into()))?;
        txn.commit().await?;
        Ok(UserRewardResponse::new(updated, &reward))
    }

    pub async fn summary(&self, user_id: i64) -> AppResult<LoyaltySummaryResponse> {
        let user = self.find_user(user_id).await?;
        let account = ensure_points_account(self.pool.as_ref(), user_id).await?;
        expire_stale_rewards(self.pool.as_ref(), Some(user_id)).await?;
        let tier = self.tier_of(&account);
        let now = Utc::now();

        let recent = ledger::Entity::find()
            .filter(ledger::Column::UserId.eq(user_id))
            .order_by_desc(ledger::Column::CreatedAt)
            .limit(5)
            .all(self.pool.as_ref())
            .await?;
        let active = ur::Entity::find()
            .filter(ur::Column::UserId.eq(user_id))
            .filter(ur::Column::Status.eq(UserRewardStatus::Active))
            .order_by_desc(ur::Column::RedeemedAt)
            .all(self.pool.as_ref())
            .await?;
        let redeemable_rewards_count = rewards::Entity::find()
            .filter(rewards::Column::IsActive.eq(true))
            .filter(rewards::Column::PointsRequired.lte(account.balance))
            .all(self.pool.as_ref())
            .await?
            .iter()
            .filter(|r| r.is_available_at(now))
            .count();
        let referrals_count = users::Entity::find()
            .filter(users::Column::ReferredBy.eq(user_id))
            .count(self.pool.as_ref())
            .await?;

        Ok(LoyaltySummaryResponse {
            tier_benefits: tier.benefits(),
            points: PointsBalanceResponse::new(account, tier),
            recent_transactions: recent.into_iter().map(PointsTransactionResponse::from).collect(),
            active_rewards: self.to_user_reward_responses(active).await?,
            redeemable_rewards_count,
            referral_code: user.referral_code,
            referrals_count,
        })
    }

    /// Claim the referral bonus for the caller using the code of the person who referred them.
    pub async fn process_referral(&self, user_id: i64, referral_code: &str) -> AppResult<()> {
        let code = referral_code.trim().to_uppercase();
        if !is_valid_referral_code(&code) {
            return Err(AppError::field("referral_code", "Invalid referral code"));
        }
        let txn = self.pool.begin().await?;
        let user = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        let referrer = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::field("referral_code", "Invalid referral code"))?;
        if referrer.id == user.id {
            return Err(AppError::field("referral_code", "You cannot refer yourself"));
        }
        if user.referred_by.is_some_and(|id| id != referrer.id) {
            return Err(AppError::field(
                "referral_code",
                "Your account was referred by someone else",
            ));
        }
        let orders_placed = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;
        if orders_placed == 0 {
            return Err(AppError::ValidationError(
                "Referral bonus is available after your first order".into(),
            ));
        }
        if user.referred_by.is_none() {
            let mut am = user.clone().into_active_model();
            am.referred_by = Set(Some(referrer.id));
            am.update(&txn).await?;
        }
        if !grant_referral_bonus(&txn, &user, &referrer, &self.config).await? {
            return Err(AppError::Conflict("Referral bonus was already granted".into()));
        }
        txn.commit().await?;
        Ok(())
    }

    /// Record a card scan. Unassigned cards log the visit but credit nobody.
    pub async fn scan_card(
        &self,
        req: ScanCardRequest,
        scanned_by: Option<i64>,
    ) -> AppResult<ScanCardResponse> {
        let code = extract_card_code(&req.qr_code)
            .ok_or_else(|| AppError::field("qr_code", "Invalid QR code format"))?;
        if req.visit_amount < 0 {
            return Err(AppError::field("visit_amount", "Amount cannot be negative"));
        }
        let now = Utc::now();
        let min_interval = self.config.min_scan_interval_minutes;

        let txn = self.pool.begin().await?;
        let card = cards::Entity::find()
            .filter(cards::Column::QrCode.eq(code.clone()))
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))?;
        if !card.is_active {
            return Err(AppError::ValidationError("Loyalty card is inactive".into()));
        }
        let cooldown_error = |minutes: i64| {
            AppError::ValidationError(format!(
                "Card was scanned recently; try again in {minutes} minute(s)"
            ))
        };
        if let Some(wait) = card.scan_cooldown_remaining(now, min_interval) {
            return Err(cooldown_error(wait));
        }
        let claimed = cards::Entity::update_many()
            .col_expr(cards::Column::LastScan, Expr::value(Some(now)))
            .col_expr(cards::Column::UpdatedAt, Expr::value(now))
            .filter(cards::Column::Id.eq(card.id))
            .filter(
                Condition::any()
                    .add(cards::Column::LastScan.is_null())
                    .add(cards::Column::LastScan.lte(now - Duration::minutes(min_interval))),
            )
            .exec(&txn)
            .await?;
        if claimed.rows_affected == 0 {
            return Err(cooldown_error(min_interval));
        }

        let (points_awarded, new_balance, customer_name) = match card.user_id {
            Some(user_id) => {
                let points = visit_points(&req.visit_type, req.visit_amount, &self.config);
                let balance = if points > 0 {
                    credit_points(
                        &txn,
                        user_id,
                        points,
                        TransactionType::PhysicalVisit,
                        format!("Restaurant visit ({})", req.visit_type),
                        None,
                    )
                    .await?
                } else {
                    ensure_points_account(&txn, user_id).await?.balance
                };
                let name = users::Entity::find_by_id(user_id)
                    .one(&txn)
                    .await?
                    .map(|u| u.full_name());
                (points, Some(balance), name)
            }
            None => (0, None, None),
        };

        scans::ActiveModel {
            card_id: Set(card.id),
            user_id: Set(card.user_id),
            visit_type: Set(req.visit_type.clone()),
            visit_amount: Set(req.visit_amount),
            points_awarded: Set(points_awarded),
            scanned_by: Set(scanned_by),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Card scanned: card={} user={:?} points={} by={:?}",
            card.id,
            card.user_id,
            points_awarded,
            scanned_by
        );
        Ok(ScanCardResponse {
            card_id: card.id,
            qr_code: card.qr_code,
            user_id: card.user_id,
            customer_name,
            points_awarded,
            new_balance,
            scan_time: now,
        })
    }

    async fn unique_qr_code<C: ConnectionTrait>(&self, db: &C) -> AppResult<String> {
        for _ in 0..10 {
            let code = generate_loyalty_qr_code();
            let taken = cards::Entity::find()
                .filter(cards::Column::QrCode.eq(code.clone()))
                .count(db)
                .await?;
            if taken == 0 {
                return Ok(code);
            }
        }
        Err(AppError::InternalError("Could not allocate a unique QR code".into()))
    }

    pub async fn my_card(&self, user_id: i64) -> AppResult<MyLoyaltyCardResponse> {
        let card = match cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
        {
            Some(card) => card,
            None => {
                let code = self.unique_qr_code(self.pool.as_ref()).await?;
                cards::Entity::insert(cards::ActiveModel {
                    qr_code: Set(code),
                    user_id: Set(Some(user_id)),
                    is_active: Set(true),
                    ..Default::default()
                })
                .on_conflict(OnConflict::column(cards::Column::UserId).do_nothing().to_owned())
                .exec_without_returning(self.pool.as_ref())
                .await?;
                cards::Entity::find()
                    .filter(cards::Column::UserId.eq(user_id))
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::InternalError("Loyalty card missing".into()))?
            }
        };
        let account = ensure_points_account(self.pool.as_ref(), user_id).await?;
        let tier = self.tier_of(&account);
        let next = tier.next(&self.config);
        Ok(MyLoyaltyCardResponse {
            card: LoyaltyCardResponse::from(card),
            points_balance: account.balance,
            total_earned: account.total_earned,
            tier,
            tier_benefits: tier.benefits(),
            next_tier: next.map(|(t, _)| t),
            points_to_next_tier: next.map(|(_, threshold)| (threshold - account.total_earned).max(0)),
        })
    }

    pub async fn regenerate_qr_code(&self, user_id: i64) -> AppResult<LoyaltyCardResponse> {
        let card = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))?;
        let code = self.unique_qr_code(self.pool.as_ref()).await?;
        let mut am = card.into_active_model();
        am.qr_code = Set(code);
        am.updated_at = Set(Utc::now());
        let card = am.update(self.pool.as_ref()).await?;
        log::info!("QR code regenerated for user {user_id}");
        Ok(LoyaltyCardResponse::from(card))
    }

    // Staff operations

    pub async fn list_cards(&self, query: &CardListQuery) -> AppResult<PaginatedResponse<LoyaltyCardResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut select = cards::Entity::find().order_by_desc(cards::Column::CreatedAt);
        if let Some(active) = query.is_active {
            select = select.filter(cards::Column::IsActive.eq(active));
        }
        match query.assigned {
            Some(true) => select = select.filter(cards::Column::UserId.is_not_null()),
            Some(false) => select = select.filter(cards::Column::UserId.is_null()),
            None => {}
        }
        let paginator = select.paginate(self.pool.as_ref(), params.page_size());
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(params.page_index()).await?;
        Ok(PaginatedResponse::from_params(
            rows.into_iter().map(LoyaltyCardResponse::from).collect(),
            &params,
            total,
        ))
    }

    pub async fn card_detail(&self, card_id: i64) -> AppResult<LoyaltyCardResponse> {
        cards::Entity::find_by_id(card_id)
            .one(self.pool.as_ref())
            .await?
            .map(LoyaltyCardResponse::from)
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))
    }

    pub async fn generate_cards(&self, count: u32) -> AppResult<Vec<LoyaltyCardResponse>> {
        if count == 0 || count > MAX_CARDS_PER_BATCH {
            return Err(AppError::field(
                "count",
                format!("Count must be between 1 and {MAX_CARDS_PER_BATCH}"),
            ));
        }
        let txn = self.pool.begin().await?;
        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let card = cards::ActiveModel {
                qr_code: Set(self.unique_qr_code(&txn).await?),
                user_id: Set(None),
                is_active: Set(true),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            created.push(LoyaltyCardResponse::from(card));
        }
        txn.commit().await?;
        log::info!("Generated {count} unassigned loyalty cards");
        Ok(created)
    }

    pub async fn link_card(&self, card_id: i64, user_id: i64) -> AppResult<LoyaltyCardResponse> {
        let txn = self.pool.begin().await?;
        let card = cards::Entity::find_by_id(card_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))?;
        if card.user_id == Some(user_id) {
            return Ok(LoyaltyCardResponse::from(card));
        }
        if card.is_assigned() {
            return Err(AppError::Conflict("Card is already linked to another customer".into()));
        }
        let user_exists = users::Entity::find_by_id(user_id).count(&txn).await?;
        if user_exists == 0 {
            return Err(AppError::field("user_id", "User does not exist"));
        }
        let other = cards::Entity::find()
            .filter(cards::Column::UserId.eq(user_id))
            .count(&txn)
            .await?;
        if other > 0 {
            return Err(AppError::Conflict("Customer already has a loyalty card".into()));
        }
        let mut am = card.into_active_model();
        am.user_id = Set(Some(user_id));
        am.updated_at = Set(Utc::now());
        let card = am.update(&txn).await?;
        txn.commit().await?;
        log::info!("Loyalty card {card_id} linked to user {user_id}");
        Ok(LoyaltyCardResponse::from(card))
    }

    pub async fn unlink_card(&self, card_id: i64) -> AppResult<LoyaltyCardResponse> {
        let card = cards::Entity::find_by_id(card_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))?;
        let mut am = card.into_active_model();
        am.user_id = Set(None);
        am.updated_at = Set(Utc::now());
        let card = am.update(self.pool.as_ref()).await?;
        log::info!("Loyalty card {card_id} unlinked");
        Ok(LoyaltyCardResponse::from(card))
    }

    pub async fn set_card_active(&self, card_id: i64, active: bool) -> AppResult<LoyaltyCardResponse> {
        let card = cards::Entity::find_by_id(card_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Loyalty card not found".into()))?;
        let mut am = card.into_active_model();
        am.is_active = Set(active);
        am.updated_at = Set(Utc::now());
        Ok(LoyaltyCardResponse::from(am.update(self.pool.as_ref()).await?))
    }

    pub async fn scan_dashboard(&self) -> AppResult<ScanDashboardResponse> {
        let total_cards = cards::Entity::find().count(self.pool.as_ref()).await?;
        let active_cards = cards::Entity::find()
            .filter(cards::Column::IsActive.eq(true))
            .count(self.pool.as_ref())
            .await?;
        let assigned_cards = cards::Entity::find()
            .filter(cards::Column::UserId.is_not_null())
            .count(self.pool.as_ref())
            .await?;
        let today_scans = scans::Entity::find()
            .filter(scans::Column::CreatedAt.gte(start_of_local_day(today_local())))
            .count(self.pool.as_ref())
            .await?;
        let recent = scans::Entity::find()
            .order_by_desc(scans::Column::CreatedAt)
            .limit(10)
            .all(self.pool.as_ref())
            .await?;
        Ok(ScanDashboardResponse {
            total_cards,
            active_cards,
            assigned_cards,
            today_scans,
            recent_scans: recent.into_iter().map(ScanRecord::from).collect(),
        })
    }

    pub async fn all_rewards(&self) -> AppResult<Vec<RewardResponse>> {
        let now = Utc::now();
        let rows = rewards::Entity::find()
            .order_by_desc(rewards::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(rows
            .into_iter()
            .map(|r| RewardResponse::new(r, now, None))
            .collect())
    }

    pub async fn create_reward(&self, req: CreateRewardRequest) -> AppResult<RewardResponse> {
        if req.name.trim().is_empty() {
            return Err(AppError::field("name", "Name is required"));
        }
        validate_reward_fields(
            &req.reward_type,
            req.points_required,
            req.discount_percentage_bp,
            req.discount_amount,
            req.valid_from,
            req.valid_until,
        )?;
        let reward = rewards::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            reward_type: Set(req.reward_type),
            points_required: Set(req.points_required),
            discount_percentage_bp: Set(req.discount_percentage_bp),
            discount_amount: Set(req.discount_amount),
            free_item_id: Set(req.free_item_id),
            is_active: Set(req.is_active.unwrap_or(true)),
            max_redemptions: Set(req.max_redemptions.unwrap_or(0).max(0)),
            current_redemptions: Set(0),
            valid_from: Set(req.valid_from.unwrap_or_else(Utc::now)),
            valid_until: Set(req.valid_until),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;
        log::info!("Reward created: {} ({})", reward.name, reward.id);
        Ok(RewardResponse::new(reward, Utc::now(), None))
    }

    pub async fn update_reward(&self, id: i64, req: UpdateRewardRequest) -> AppResult<RewardResponse> {
        let reward = rewards::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Reward not found".into()))?;
        validate_reward_fields(
            req.reward_type.as_ref().unwrap_or(&reward.reward_type),
            req.points_required.unwrap_or(reward.points_required),
            req.discount_percentage_bp.or(reward.discount_percentage_bp),
            req.discount_amount.or(reward.discount_amount),
            Some(req.valid_from.unwrap_or(reward.valid_from)),
            req.valid_until.or(reward.valid_until),
        )?;
        let mut am = reward.into_active_model();
        if let Some(v) = req.name {
            am.name = Set(v.trim().to_string());
        }
        if let Some(v) = req.description {
            am.description = Set(v);
        }
        if let Some(v) = req.reward_type {
            am.reward_type = Set(v);
        }
        if let Some(v) = req.points_required {
            am.points_required = Set(v);
        }
        if let Some(v) = req.discount_percentage_bp {
            am.discount_percentage_bp = Set(Some(v));
        }
        if let Some(v) = req.discount_amount {
            am.discount_amount = Set(Some(v));
        }
        if let Some(v) = req.free_item_id {
            am.free_item_id = Set(Some(v));
        }
        if let Some(v) = req.is_active {
            am.is_active = Set(v);
        }
        if let Some(v) = req.max_redemptions {
            am.max_redemptions = Set(v.max(0));
        }
        if let Some(v) = req.valid_from {
            am.valid_from = Set(v);
        }
        if let Some(v) = req.valid_until {
            am.valid_until = Set(Some(v));
        }
        am.updated_at = Set(Utc::now());
        Ok(RewardResponse::new(am.update(self.pool.as_ref()).await?, Utc::now(), None))
    }

    pub async fn delete_reward(&self, id: i64) -> AppResult<()> {
        let redeemed = ur::Entity::find()
            .filter(ur::Column::RewardId.eq(id))
            .count(self.pool.as_ref())
            .await?;
        if redeemed > 0 {
            return Err(AppError::Conflict(
                "Reward has been redeemed; deactivate it instead".into(),
            ));
        }
        let res = rewards::Entity::delete_by_id(id).exec(self.pool.as_ref()).await?;
        if res.rows_affected == 0 {
            return Err(AppError::NotFound("Reward not found".into()));
        }
        Ok(())
    }

    /// Mark redeemed rewards past their expiry as expired.
    pub async fn expire_rewards(&self) -> AppResult<u64> {
        expire_stale_rewards(self.pool.as_ref(), None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{RewardType, VisitType};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult { last_insert_id: 0, rows_affected }
    }

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn account(user_id: i64, balance: i64) -> up::Model {
        let now = Utc::now();
        up::Model {
            id: user_id,
            user_id,
            balance,
            total_earned: balance,
            total_spent: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn ledger_row(user_id: i64, amount: i64, balance_after: i64, related_user_id: Option<i64>) -> ledger::Model {
        ledger::Model {
            id: 1,
            user_id,
            amount,
            transaction_type: TransactionType::Spent,
            reason: String::new(),
            balance_after,
            order_id: None,
            related_user_id,
            created_at: Utc::now(),
        }
    }

    fn user(id: i64, referral_code: &str, referred_by: Option<i64>) -> users::Model {
        let now = Utc::now();
        users::Model {
            id,
            email: format!("user{id}@example.com"),
            username: None,
            password_hash: None,
            first_name: "Ada".into(),
            last_name: "Obi".into(),
            phone: None,
            date_of_birth: None,
            avatar_url: None,
            referral_code: referral_code.into(),
            referred_by,
            is_staff: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn reward(points_required: i64) -> rewards::Model {
        let now = Utc::now();
        rewards::Model {
            id: 1,
            name: "Free Chapman".into(),
            description: String::new(),
            reward_type: RewardType::FreeItem,
            points_required,
            discount_percentage_bp: None,
            discount_amount: None,
            free_item_id: None,
            is_active: true,
            max_redemptions: 0,
            current_redemptions: 0,
            valid_from: now - Duration::days(1),
            valid_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn card(user_id: Option<i64>) -> cards::Model {
        let now = Utc::now();
        cards::Model {
            id: 5,
            qr_code: "LOYALTY-3F9A1C0B7D2E".into(),
            user_id,
            is_active: true,
            last_scan: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn scan_row(user_id: Option<i64>, points_awarded: i64) -> scans::Model {
        scans::Model {
            id: 1,
            card_id: 5,
            user_id,
            visit_type: VisitType::General,
            visit_amount: 0,
            points_awarded,
            scanned_by: Some(1),
            created_at: Utc::now(),
        }
    }

    fn scan_request(visit_amount: i64) -> ScanCardRequest {
        ScanCardRequest {
            qr_code: "LOYALTY:LOYALTY-3F9A1C0B7D2E".into(),
            visit_type: VisitType::General,
            visit_amount,
        }
    }

    /// Every statement the mock connection saw, rendered for substring checks.
    fn statements(db: DatabaseConnection) -> String {
        format!("{:?}", db.into_transaction_log())
    }

    fn pool_statements(pool: DbPool) -> String {
        match Arc::try_unwrap(pool) {
            Ok(db) => statements(db),
            Err(_) => panic!("pool still shared"),
        }
    }

    #[test]
    fn test_discount_reward_needs_value() {
        assert!(validate_reward_fields(&RewardType::Discount, 500, None, None, None, None).is_err());
        assert!(validate_reward_fields(&RewardType::Discount, 500, Some(1000), None, None, None).is_ok());
        assert!(validate_reward_fields(&RewardType::Discount, 500, None, Some(50_000), None, None).is_ok());
    }

    #[test]
    fn test_reward_cost_must_be_positive() {
        assert!(validate_reward_fields(&RewardType::FreeDelivery, 0, None, None, None, None).is_err());
    }

    #[test]
    fn test_reward_window_order() {
        let now = Utc::now();
        let res = validate_reward_fields(
            &RewardType::Cashback,
            100,
            None,
            Some(10_000),
            Some(now),
            Some(now - Duration::days(1)),
        );
        match res {
            Err(AppError::FieldErrors(errs)) => assert_eq!(errs[0].field, "valid_until"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_debit_never_overdraws() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[account(7, 100)]])
            .append_exec_results([exec(0)])
            .into_connection();
        let err = debit_points(&db, 7, 500, TransactionType::Spent, "Redeemed", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m == "Insufficient points"));

        let log = statements(db);
        assert!(log.contains(r#"\"balance\" >= $"#), "debit must be conditional: {log}");
        assert!(!log.contains("points_transactions"));
    }

    #[actix_web::test]
    async fn test_debit_writes_negative_entry() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[account(7, 300)]])
            .append_exec_results([exec(1)])
            .append_query_results([[account(7, 100)]])
            .append_query_results([[ledger_row(7, -200, 100, None)]])
            .into_connection();
        let balance = debit_points(&db, 7, 200, TransactionType::Spent, "Redeemed", None)
            .await
            .unwrap();
        assert_eq!(balance, 100);
        assert!(statements(db).contains("BigInt(Some(-200))"));
    }

    #[actix_web::test]
    async fn test_redeem_refused_without_enough_points() {
        let pool: DbPool = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reward(200)]])
                .append_query_results([[account(7, 150)]])
                .into_connection(),
        );
        let svc = LoyaltyService::new(pool.clone(), LoyaltyConfig::default());
        let err = svc.redeem(7, 1).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref m) if m.contains("Insufficient points")));

        drop(svc);
        let log = pool_statements(pool);
        assert!(!log.contains("UPDATE"));
        assert!(!log.contains("INSERT"));
    }

    #[actix_web::test]
    async fn test_redeem_spends_exactly_points_required() {
        let now = Utc::now();
        let pool: DbPool = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[reward(200)]])
                .append_query_results([[account(7, 500)], [account(7, 500)], [account(7, 300)]])
                .append_query_results([[ledger_row(7, -200, 300, None)]])
                .append_query_results([[ur::Model {
                    id: 9,
                    user_id: 7,
                    reward_id: 1,
                    points_spent: 200,
                    status: UserRewardStatus::Active,
                    redeemed_at: now,
                    used_at: None,
                    expires_at: Some(now + Duration::days(30)),
                    order_id: None,
                }]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );
        let svc = LoyaltyService::new(pool.clone(), LoyaltyConfig::default());
        let redeemed = svc.redeem(7, 1).await.unwrap();
        assert_eq!(redeemed.remaining_points, 300);
        assert_eq!(redeemed.user_reward.points_spent, 200);

        drop(svc);
        let log = pool_statements(pool);
        assert!(log.contains("BigInt(Some(-200))"));
        assert!(log.contains("COMMIT"));
    }

    #[actix_web::test]
    async fn test_unassigned_card_scan_records_zero_points() {
        let pool: DbPool = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[card(None)]])
                .append_query_results([[scan_row(None, 0)]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let svc = LoyaltyService::new(pool.clone(), LoyaltyConfig::default());
        let scan = svc.scan_card(scan_request(250_000), Some(1)).await.unwrap();
        assert_eq!(scan.points_awarded, 0);
        assert_eq!(scan.new_balance, None);
        assert_eq!(scan.customer_name, None);

        drop(svc);
        let log = pool_statements(pool);
        assert!(log.contains("card_scans"));
        assert!(!log.contains("user_points"));
        assert!(!log.contains("points_transactions"));
    }

    #[actix_web::test]
    async fn test_zero_point_visit_still_records_scan() {
        let cfg = LoyaltyConfig {
            physical_visit_points: 0,
            ..LoyaltyConfig::default()
        };
        let pool: DbPool = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[card(Some(9))]])
                .append_query_results([[account(9, 40)]])
                .append_query_results([Vec::<users::Model>::new()])
                .append_query_results([[scan_row(Some(9), 0)]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let svc = LoyaltyService::new(pool.clone(), cfg);
        let scan = svc.scan_card(scan_request(0), Some(1)).await.unwrap();
        assert_eq!(scan.points_awarded, 0);
        assert_eq!(scan.new_balance, Some(40));

        drop(svc);
        assert!(!pool_statements(pool).contains("points_transactions"));
    }

    #[actix_web::test]
    async fn test_referral_bonus_ignores_bonuses_earned_as_referrer() {
        // A referred B; B already earned a bonus for referring C. B's first
        // paid order must still pay out to both A and B.
        let a = user(1, "AAAAAAAA", None);
        let b = user(2, "BBBBBBBB", Some(1));
        let cfg = LoyaltyConfig::default();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[account(2, 1000)], [account(2, 2000)]])
            .append_query_results([[ledger_row(2, 1000, 2000, Some(1))]])
            .append_query_results([[account(1, 0)], [account(1, 1000)]])
            .append_query_results([[ledger_row(1, 1000, 1000, Some(2))]])
            .append_exec_results([exec(1), exec(1)])
            .into_connection();

        assert!(grant_referral_bonus(&db, &b, &a, &cfg).await.unwrap());
        let log = statements(db);
        assert!(
            log.contains(r#".\"related_user_id\" = $"#),
            "already-paid check must filter on the referrer: {log}"
        );
        assert!(log.contains("Referral bonus from AAAAAAAA"));
        assert!(log.contains("Referral bonus for BBBBBBBB"));
    }

    #[actix_web::test]
    async fn test_referral_bonus_paid_once() {
        let a = user(1, "AAAAAAAA", None);
        let b = user(2, "BBBBBBBB", Some(1));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(1)]])
            .into_connection();
        assert!(!grant_referral_bonus(&db, &b, &a, &LoyaltyConfig::default()).await.unwrap());
        assert!(!statements(db).contains("INSERT"));
    }
}
