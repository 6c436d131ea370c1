use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use uuid::Uuid;

use crate::infra::db::postgres::schema::ledger_outbox;

/// Best-effort notification queued alongside a ledger mutation.
/// Delivery failures never roll back or block the financial write.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = ledger_outbox)]
pub struct LedgerOutboxEntity {
    pub id: Uuid,
    pub topic: String,
    pub payload: Value,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ledger_outbox)]
pub struct InsertLedgerOutboxEntity {
    pub topic: String,
    pub payload: Value,
    pub status: String,
}
