use anyhow::Result;
use chrono::{Duration as ChronoDuration, Utc};
use crates::domain::repositories::billing_dedup::BillingDedupRepository;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

const PRUNE_INTERVAL_SECS: u64 = 3600;

/// Trims the webhook event-id cache down to its retention window. The
/// payment-level idempotency records are never pruned.
pub async fn run(
    dedup_repo: Arc<dyn BillingDedupRepository + Send + Sync>,
    retention_hours: i64,
) -> Result<()> {
    info!(retention_hours, "Starting webhook event cache prune loop");
    loop {
        let cutoff = Utc::now() - ChronoDuration::hours(retention_hours);
        match dedup_repo.prune_events_before(cutoff).await {
            Ok(removed) if removed > 0 => {
                info!(removed, "Pruned webhook event cache");
            }
            Ok(_) => {}
            Err(e) => {
                error!("Webhook event cache prune failed: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_secs(PRUNE_INTERVAL_SECS)).await;
    }
}
