use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::ledger_outbox::{InsertLedgerOutboxEntity, LedgerOutboxEntity};

#[automock]
#[async_trait]
pub trait OutboxRepository {
    async fn enqueue(&self, entries: Vec<InsertLedgerOutboxEntity>) -> Result<()>;

    async fn list_pending(&self, limit: i64) -> Result<Vec<LedgerOutboxEntity>>;

    async fn mark_sent(&self, outbox_id: Uuid, now: DateTime<Utc>) -> Result<()>;

    /// Bumps the attempt counter; past `max_attempts` the entry is parked
    /// as failed instead of being retried forever.
    async fn mark_attempt_failed(
        &self,
        outbox_id: Uuid,
        error: &str,
        max_attempts: i32,
    ) -> Result<()>;
}
