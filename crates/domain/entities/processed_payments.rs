use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::processed_payments;

/// Durable idempotency record for one settled payment.
///
/// `(subscription_ref, provider_payment_id)` carries a unique constraint;
/// a conflicting insert is the duplicate-delivery signal.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = processed_payments)]
pub struct ProcessedPaymentEntity {
    pub id: Uuid,
    pub subscription_ref: String,
    pub provider_payment_id: String,
    pub earning_ids: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = processed_payments)]
pub struct InsertProcessedPaymentEntity {
    pub subscription_ref: String,
    pub provider_payment_id: String,
    pub earning_ids: Value,
}
