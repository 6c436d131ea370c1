use anyhow::{Result, anyhow};
use reqwest::Client;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::warn;
use url::Url;

/// Queued, fire-and-forget Discord delivery so the logging path never
/// blocks on the network.
#[derive(Clone)]
pub(crate) struct DiscordNotifier {
    tx: mpsc::Sender<String>,
}

impl DiscordNotifier {
    pub(crate) fn spawn(webhook_url: Url) -> Self {
        let (tx, mut rx) = mpsc::channel::<String>(256);

        tokio::spawn(async move {
            let client = Client::builder()
                .timeout(std::time::Duration::from_secs(3))
                .build()
                .expect("reqwest client must build");

            while let Some(content) = rx.recv().await {
                if let Err(error) = post(&client, &webhook_url, content).await {
                    warn!(error = %error, "Discord notification failed");
                }
            }
        });

        Self { tx }
    }

    pub(crate) fn try_notify(&self, content: String) {
        if self.tx.try_send(content).is_err() {
            warn!("Discord notification queue full or closed; dropping event");
        }
    }
}

async fn post(client: &Client, webhook_url: &Url, content: String) -> Result<()> {
    let response = client
        .post(webhook_url.clone())
        .json(&json!({ "content": truncate_for_discord(content) }))
        .send()
        .await
        .map_err(sanitize_reqwest_error)?;

    if response.status().is_success() {
        return Ok(());
    }

    Err(anyhow!(
        "discord webhook returned non-success status: {}",
        response.status()
    ))
}

fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("discord webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("discord webhook connection failed");
    }
    anyhow!("discord webhook request failed")
}

fn truncate_for_discord(mut content: String) -> String {
    const LIMIT: usize = 2000;
    const SUFFIX: &str = "\n… (truncated)";

    if content.chars().count() <= LIMIT {
        return content;
    }

    let allowed = LIMIT.saturating_sub(SUFFIX.chars().count());
    let truncated: String = content.chars().take(allowed).collect();
    content.clear();
    content.push_str(&truncated);
    content.push_str(SUFFIX);
    content
}
