use anyhow::Result;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::value_objects::{
    billing_facts::{BillingFact, SubscriptionReversalEvent},
    enums::{billing_reasons::BillingReason, payout_statuses::PayoutStatus},
    payouts::PayoutOutcomeEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Signed event envelope delivered by the billing provider.
#[derive(Debug, Deserialize)]
pub struct ProviderEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub data: ProviderEventData,
}

#[derive(Debug, Deserialize)]
pub struct ProviderEventData {
    pub object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct BillingObject {
    subscription: String,
    payment_id: String,
    referred_user_id: Uuid,
    amount_minor: i64,
    currency: String,
    plan: String,
    billing_reason: String,
    #[serde(default)]
    beneficiary_chain: Vec<Uuid>,
    #[serde(default)]
    gifted: bool,
}

#[derive(Debug, Deserialize)]
struct ReversalObject {
    subscription: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PayoutObject {
    id: String,
    failure_code: Option<String>,
    failure_message: Option<String>,
}

/// Verifies and decodes the provider's webhook envelopes. Signature scheme
/// is `t=<unix>,v1=<hex hmac-sha256 of "<t>.<payload>">` over the raw body.
pub struct BillingProviderClient {
    billing_webhook_secret: String,
    payout_webhook_secret: String,
}

impl BillingProviderClient {
    pub fn new(billing_webhook_secret: String, payout_webhook_secret: String) -> Self {
        Self {
            billing_webhook_secret,
            payout_webhook_secret,
        }
    }

    pub fn verify_billing_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent> {
        Self::verify(&self.billing_webhook_secret, payload, signature_header)
    }

    pub fn verify_payout_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<ProviderEvent> {
        Self::verify(&self.payout_webhook_secret, payload, signature_header)
    }

    fn verify(secret: &str, payload: &[u8], signature_header: &str) -> Result<ProviderEvent> {
        let mut timestamp: Option<String> = None;
        let mut signature: Option<String> = None;

        for part in signature_header.split(',') {
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest.to_string());
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signature = Some(rest.to_string());
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in signature header"))?;
        let signature =
            signature.ok_or_else(|| anyhow::anyhow!("missing v1 in signature header"))?;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
        mac.update(signed_payload.as_bytes());
        let expected = mac.finalize().into_bytes();
        let provided = hex::decode(signature)?;

        if expected[..] != provided[..] {
            anyhow::bail!("invalid webhook signature");
        }

        let event: ProviderEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    pub fn extract_billing_fact(event: &ProviderEvent) -> Option<BillingFact> {
        let object: BillingObject = serde_json::from_value(event.data.object.clone()).ok()?;
        let billing_reason = BillingReason::from_str(&object.billing_reason)?;

        Some(BillingFact {
            subscription_ref: object.subscription,
            provider_payment_id: object.payment_id,
            referred_user_id: object.referred_user_id,
            gross_amount_minor: object.amount_minor,
            currency: object.currency,
            plan: object.plan,
            billing_reason,
            beneficiary_chain: object.beneficiary_chain,
            is_gifted: object.gifted,
        })
    }

    pub fn extract_reversal(event: &ProviderEvent) -> Option<SubscriptionReversalEvent> {
        let object: ReversalObject = serde_json::from_value(event.data.object.clone()).ok()?;
        let reason = object.reason.unwrap_or_else(|| match event.type_.as_str() {
            "charge.refunded" => "charge_refunded".to_string(),
            _ => "subscription_cancelled".to_string(),
        });

        Some(SubscriptionReversalEvent {
            subscription_ref: object.subscription,
            reason,
        })
    }

    pub fn extract_payout_outcome(event: &ProviderEvent) -> Option<PayoutOutcomeEvent> {
        let status = match event.type_.as_str() {
            "payout.processing" => PayoutStatus::Processing,
            "payout.in_transit" => PayoutStatus::InTransit,
            "payout.paid" => PayoutStatus::Paid,
            "payout.failed" => PayoutStatus::Failed,
            "payout.cancelled" => PayoutStatus::Cancelled,
            "payout.returned" => PayoutStatus::Returned,
            _ => return None,
        };
        let object: PayoutObject = serde_json::from_value(event.data.object.clone()).ok()?;

        Some(PayoutOutcomeEvent {
            provider_payout_id: object.id,
            status,
            failure_code: object.failure_code,
            failure_message: object.failure_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";

    fn sign(payload: &str, timestamp: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        format!("t={},v1={}", timestamp, signature)
    }

    fn client() -> BillingProviderClient {
        BillingProviderClient::new(SECRET.to_string(), SECRET.to_string())
    }

    fn billing_payload() -> String {
        serde_json::json!({
            "id": "evt_1",
            "type": "invoice.payment_succeeded",
            "created": 1714000000,
            "data": { "object": {
                "subscription": "sub_42",
                "payment_id": "pay_42",
                "referred_user_id": Uuid::new_v4(),
                "amount_minor": 10000,
                "currency": "USD",
                "plan": "pro",
                "billing_reason": "first",
                "beneficiary_chain": [Uuid::new_v4()],
                "gifted": false
            }}
        })
        .to_string()
    }

    #[test]
    fn accepts_a_correctly_signed_event() {
        let payload = billing_payload();
        let header = sign(&payload, "1714000000", SECRET);

        let event = client()
            .verify_billing_signature(payload.as_bytes(), &header)
            .unwrap();
        assert_eq!(event.type_, "invoice.payment_succeeded");

        let fact = BillingProviderClient::extract_billing_fact(&event).unwrap();
        assert_eq!(fact.subscription_ref, "sub_42");
        assert_eq!(fact.gross_amount_minor, 10000);
        assert_eq!(fact.billing_reason, BillingReason::First);
    }

    #[test]
    fn rejects_a_tampered_payload() {
        let payload = billing_payload();
        let header = sign(&payload, "1714000000", SECRET);
        let tampered = payload.replace("10000", "99999");

        assert!(
            client()
                .verify_billing_signature(tampered.as_bytes(), &header)
                .is_err()
        );
    }

    #[test]
    fn rejects_a_wrong_secret() {
        let payload = billing_payload();
        let header = sign(&payload, "1714000000", "whsec_other");

        assert!(
            client()
                .verify_billing_signature(payload.as_bytes(), &header)
                .is_err()
        );
    }

    #[test]
    fn rejects_a_header_without_signature() {
        let payload = billing_payload();

        assert!(
            client()
                .verify_billing_signature(payload.as_bytes(), "t=1714000000")
                .is_err()
        );
    }

    #[test]
    fn maps_payout_event_types_to_statuses() {
        let payload = serde_json::json!({
            "id": "evt_2",
            "type": "payout.failed",
            "created": 1714000000,
            "data": { "object": {
                "id": "po_9",
                "failure_code": "account_closed",
                "failure_message": "destination account closed"
            }}
        })
        .to_string();
        let header = sign(&payload, "1714000000", SECRET);

        let event = client()
            .verify_payout_signature(payload.as_bytes(), &header)
            .unwrap();
        let outcome = BillingProviderClient::extract_payout_outcome(&event).unwrap();
        assert_eq!(outcome.provider_payout_id, "po_9");
        assert_eq!(outcome.status, PayoutStatus::Failed);
        assert_eq!(outcome.failure_code.as_deref(), Some("account_closed"));
    }

    #[test]
    fn reversal_reason_defaults_by_event_type() {
        let payload = serde_json::json!({
            "id": "evt_3",
            "type": "charge.refunded",
            "created": 1714000000,
            "data": { "object": { "subscription": "sub_42", "reason": null } }
        })
        .to_string();
        let header = sign(&payload, "1714000000", SECRET);

        let event = client()
            .verify_billing_signature(payload.as_bytes(), &header)
            .unwrap();
        let reversal = BillingProviderClient::extract_reversal(&event).unwrap();
        assert_eq!(reversal.reason, "charge_refunded");
    }
}
