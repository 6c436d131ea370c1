use anyhow::Result;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

/// Minimal payout-dispatch client built on reqwest. The rail behind it is
/// opaque: we submit a payout and learn its fate from outcome webhooks.
pub struct PayoutDispatchClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Clone)]
pub struct PayoutSubmission {
    pub payout_id: Uuid,
    pub destination_account_ref: String,
    pub method: String,
    pub net_amount_minor: i64,
    pub currency: String,
}

impl PayoutDispatchClient {
    pub fn new(secret_key: String, api_base: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            api_base,
        }
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            provider_request_id = ?request_id,
            response_body = %body,
            context = %context,
            "payout provider request failed"
        );

        anyhow::bail!(
            "payout provider request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Submits the payout and returns the provider's payout id.
    pub async fn submit_payout(&self, submission: &PayoutSubmission) -> Result<String> {
        let body = [
            ("amount", submission.net_amount_minor.to_string()),
            ("currency", submission.currency.clone()),
            ("destination", submission.destination_account_ref.clone()),
            ("method", submission.method.clone()),
            ("metadata[payout_id]", submission.payout_id.to_string()),
        ];

        let resp = self
            .http
            .post(format!("{}/v1/payouts", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "submit payout").await?;

        #[derive(Deserialize)]
        struct PayoutResp {
            id: String,
        }

        let parsed: PayoutResp = resp.json().await?;
        Ok(parsed.id)
    }
}
