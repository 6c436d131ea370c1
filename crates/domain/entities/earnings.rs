use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::infra::db::postgres::schema::earnings;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = earnings)]
pub struct EarningEntity {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub referred_user_id: Uuid,
    pub subscription_ref: String,
    pub source: String,
    pub origin_earning_id: Option<Uuid>,
    pub gross_amount_minor: i64,
    pub commission_rate: Decimal,
    pub commission_amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub tier_level: i32,
    pub is_gifted: bool,
    pub payment_completed_at: Option<DateTime<Utc>>,
    pub hold_policy: String,
    pub hold_period_days: i32,
    pub eligible_for_payout_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub paid_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub disputed_by: Option<Uuid>,
    pub disputed_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_reason: Option<String>,
    pub payout_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = earnings)]
pub struct InsertEarningEntity {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub referred_user_id: Uuid,
    pub subscription_ref: String,
    pub source: String,
    pub origin_earning_id: Option<Uuid>,
    pub gross_amount_minor: i64,
    pub commission_rate: Decimal,
    pub commission_amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub tier_level: i32,
    pub is_gifted: bool,
    pub payment_completed_at: Option<DateTime<Utc>>,
    pub hold_policy: String,
    pub hold_period_days: i32,
    pub eligible_for_payout_at: DateTime<Utc>,
}
