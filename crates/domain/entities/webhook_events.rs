use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infra::db::postgres::schema::webhook_events;

/// Time-windowed cache of provider event ids, used to short-circuit
/// whole-event reprocessing. The payment-level record is the ground truth.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = webhook_events)]
pub struct WebhookEventEntity {
    pub id: Uuid,
    pub provider_event_id: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_events)]
pub struct InsertWebhookEventEntity {
    pub provider_event_id: String,
}
