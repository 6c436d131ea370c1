use anyhow::{Result, anyhow};
use async_trait::async_trait;
use url::Url;

use crate::domain::entities::ledger_outbox::LedgerOutboxEntity;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutboxDelivery: Send + Sync {
    async fn deliver(&self, entry: &LedgerOutboxEntity) -> Result<()>;
}

/// Posts ledger events to a configured webhook endpoint. Delivery is
/// best-effort; the drain loop owns retries.
pub struct WebhookOutboxDelivery {
    client: reqwest::Client,
    webhook_url: Url,
}

impl WebhookOutboxDelivery {
    pub fn new(webhook_url: Url) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("reqwest client must build");

        Self {
            client,
            webhook_url,
        }
    }
}

#[async_trait]
impl OutboxDelivery for WebhookOutboxDelivery {
    async fn deliver(&self, entry: &LedgerOutboxEntity) -> Result<()> {
        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&serde_json::json!({
                "id": entry.id,
                "topic": entry.topic,
                "payload": entry.payload,
                "occurred_at": entry.created_at,
            }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "outbox webhook returned non-success status: {}",
            response.status()
        ))
    }
}
