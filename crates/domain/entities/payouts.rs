use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::payouts;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = payouts)]
pub struct PayoutEntity {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub destination_account_ref: String,
    pub method: String,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub net_amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub provider_payout_id: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payouts)]
pub struct InsertPayoutEntity {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub destination_account_ref: String,
    pub method: String,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub net_amount_minor: i64,
    pub currency: String,
    pub status: String,
}
