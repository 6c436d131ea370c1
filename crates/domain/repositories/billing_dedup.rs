use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;

/// Secondary event-id dedup window. This only short-circuits whole-event
/// reprocessing; `processed_payments` remains the ground truth.
#[automock]
#[async_trait]
pub trait BillingDedupRepository {
    /// Atomic insert-if-absent; `false` means the event id was seen before.
    async fn record_event_if_new(&self, provider_event_id: &str) -> Result<bool>;

    async fn prune_events_before(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
