use chrono::{DateTime, Duration, Utc};
use sea_orm::entity::prelude::*;

/// Physical or virtual card identified by the code inside its QR image.
/// A card without `user_id` has not been handed to a customer yet.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "loyalty_cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub qr_code: String,
    #[sea_orm(unique)]
    pub user_id: Option<i64>,
    pub is_active: bool,
    pub last_scan: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_assigned(&self) -> bool {
        self.user_id.is_some()
    }

    /// Minutes the caller still has to wait before the next scan counts.
    pub fn scan_cooldown_remaining(&self, now: DateTime<Utc>, min_interval_minutes: i64) -> Option<i64> {
        let last = self.last_scan?;
        let ready_at = last + Duration::minutes(min_interval_minutes);
        if now < ready_at {
            let secs = (ready_at - now).num_seconds();
            Some((secs + 59) / 60)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(last_scan: Option<DateTime<Utc>>) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            qr_code: "LOYALTY-000000000001".into(),
            user_id: None,
            is_active: true,
            last_scan,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_cooldown() {
        let now = Utc::now();
        assert_eq!(card(None).scan_cooldown_remaining(now, 30), None);
        assert_eq!(
            card(Some(now - Duration::minutes(10))).scan_cooldown_remaining(now, 30),
            Some(20)
        );
        assert_eq!(
            card(Some(now - Duration::minutes(30))).scan_cooldown_remaining(now, 30),
            None
        );
    }
}
