use anyhow::Result;
use chrono::Utc;
use crates::{
    domain::repositories::outbox::OutboxRepository, infra::notify::OutboxDelivery,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info, warn};

/// Drains pending outbox entries to the notification webhook. Strictly
/// best-effort: a delivery failure bumps the attempt counter and the
/// entry is retried on a later pass, up to the attempt cap.
pub async fn run(
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    delivery: Arc<dyn OutboxDelivery>,
    interval_secs: u64,
    batch_size: i64,
    max_attempts: i32,
) -> Result<()> {
    info!(interval_secs, batch_size, "Starting outbox drain loop");
    loop {
        match outbox_repo.list_pending(batch_size).await {
            Ok(entries) if entries.is_empty() => {}
            Ok(entries) => {
                info!(count = entries.len(), "Draining outbox entries");
                for entry in entries {
                    match delivery.deliver(&entry).await {
                        Ok(()) => {
                            if let Err(e) = outbox_repo.mark_sent(entry.id, Utc::now()).await {
                                error!("Failed to mark outbox entry {} sent: {}", entry.id, e);
                            }
                        }
                        Err(e) => {
                            warn!(
                                outbox_id = %entry.id,
                                topic = %entry.topic,
                                error = %e,
                                "Outbox delivery failed"
                            );
                            if let Err(mark_err) = outbox_repo
                                .mark_attempt_failed(entry.id, &e.to_string(), max_attempts)
                                .await
                            {
                                error!(
                                    "Failed to record outbox attempt for {}: {}",
                                    entry.id, mark_err
                                );
                            }
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to list pending outbox entries: {}", e);
            }
        }

        tokio::time::sleep(Duration::from_secs(interval_secs)).await;
    }
}
