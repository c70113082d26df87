use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "visit_type")]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[default]
    #[sea_orm(string_value = "general")]
    General,
    #[sea_orm(string_value = "lunch")]
    Lunch,
    #[sea_orm(string_value = "dinner")]
    Dinner,
    #[sea_orm(string_value = "happy_hour")]
    HappyHour,
}

impl std::fmt::Display for VisitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VisitType::General => write!(f, "general"),
            VisitType::Lunch => write!(f, "lunch"),
            VisitType::Dinner => write!(f, "dinner"),
            VisitType::HappyHour => write!(f, "happy_hour"),
        }
    }
}

/// Scan history; `user_id` is None when the card was unassigned at scan time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "card_scans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub card_id: i64,
    pub user_id: Option<i64>,
    pub visit_type: VisitType,
    pub visit_amount: i64,
    pub points_awarded: i64,
    pub scanned_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
