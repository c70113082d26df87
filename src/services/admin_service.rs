use crate::database::DbPool;
use crate::entities::{
    OrderPaymentStatus, OrderStatus, loyalty_card_entity as cards, menu_item_entity as menu,
    order_entity as orders, promo_code_entity as promo, user_entity as users,
};
use crate::error::AppResult;
use crate::models::DashboardStats;
use crate::utils::dates::{start_of_local_day, today_local};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Select};

#[derive(Clone)]
pub struct AdminService {
    pool: DbPool,
}

impl AdminService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn revenue(&self, select: Select<orders::Entity>) -> AppResult<i64> {
        let total: Option<Option<i64>> = select
            .filter(orders::Column::PaymentStatus.eq(OrderPaymentStatus::Paid))
            .select_only()
            .column_as(
                Expr::col(orders::Column::TotalAmount)
                    .sum()
                    .cast_as(Alias::new("bigint")),
                "revenue",
            )
            .into_tuple()
            .one(self.pool.as_ref())
            .await?;
        Ok(total.flatten().unwrap_or(0))
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let today = start_of_local_day(today_local());
        let now = Utc::now();

        let total_users = users::Entity::find().count(self.pool.as_ref()).await?;
        let total_orders = orders::Entity::find().count(self.pool.as_ref()).await?;
        let pending_orders = orders::Entity::find()
            .filter(orders::Column::Status.eq(OrderStatus::Pending))
            .count(self.pool.as_ref())
            .await?;
        let orders_today = orders::Entity::find()
            .filter(orders::Column::CreatedAt.gte(today))
            .count(self.pool.as_ref())
            .await?;
        let revenue_today = self
            .revenue(orders::Entity::find().filter(orders::Column::CreatedAt.gte(today)))
            .await?;
        let total_revenue = self.revenue(orders::Entity::find()).await?;
        let menu_items = menu::Entity::find().count(self.pool.as_ref()).await?;
        let active_promo_codes = promo::Entity::find()
            .filter(promo::Column::IsActive.eq(true))
            .filter(promo::Column::ValidFrom.lte(now))
            .filter(promo::Column::ValidUntil.gte(now))
            .count(self.pool.as_ref())
            .await?;
        let loyalty_cards = cards::Entity::find().count(self.pool.as_ref()).await?;

        Ok(DashboardStats {
            total_users,
            total_orders,
            pending_orders,
            orders_today,
            revenue_today,
            total_revenue,
            menu_items,
            active_promo_codes,
            loyalty_cards,
        })
    }
}
