use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::billing_reasons::BillingReason;

/// One settled charge reported by the billing provider.
///
/// `beneficiary_chain` is ordered nearest-first: the subscriber's direct
/// referrer, then that referrer's own referrer when one exists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillingFact {
    pub subscription_ref: String,
    pub provider_payment_id: String,
    pub referred_user_id: Uuid,
    pub gross_amount_minor: i64,
    pub currency: String,
    pub plan: String,
    pub billing_reason: BillingReason,
    pub beneficiary_chain: Vec<Uuid>,
    pub is_gifted: bool,
}

/// Upstream cancellation, refund or deauthorization of a subscription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionReversalEvent {
    pub subscription_ref: String,
    pub reason: String,
}
