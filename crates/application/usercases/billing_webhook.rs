use std::sync::Arc;

use anyhow::Result as AnyResult;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    billing::provider_events::{BillingProviderClient, ProviderEvent},
    domain::{
        entities::{
            earnings::InsertEarningEntity, ledger_outbox::InsertLedgerOutboxEntity,
            processed_payments::InsertProcessedPaymentEntity,
        },
        repositories::{
            billing_dedup::BillingDedupRepository, earnings::EarningRepository,
            outbox::OutboxRepository,
        },
        value_objects::{
            billing_facts::BillingFact,
            commission::{self, CommissionError, CommissionTable, HoldPolicy},
            enums::{
                billing_reasons::BillingReason, earning_statuses::EarningStatus,
                outbox_statuses::OutboxStatus,
            },
        },
    },
};

use super::reversals::ReversalUseCase;

#[cfg_attr(test, mockall::automock)]
pub trait BillingEventGateway: Send + Sync {
    fn verify_billing_signature(&self, payload: &[u8], signature: &str)
    -> AnyResult<ProviderEvent>;
}

impl BillingEventGateway for BillingProviderClient {
    fn verify_billing_signature(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> AnyResult<ProviderEvent> {
        self.verify_billing_signature(payload, signature)
    }
}

#[derive(Debug, Error)]
pub enum BillingWebhookError {
    #[error("invalid webhook payload: {0}")]
    InvalidWebhook(String),
    #[error("no commission rate configured for plan '{0}'")]
    MissingPlanRate(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BillingWebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            BillingWebhookError::InvalidWebhook(_) => StatusCode::BAD_REQUEST,
            BillingWebhookError::MissingPlanRate(_) => StatusCode::INTERNAL_SERVER_ERROR,
            BillingWebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// What a delivered event amounted to. Duplicates are acknowledged, not
/// errored, so the provider stops redelivering.
#[derive(Debug, PartialEq)]
pub enum IngestOutcome {
    Created { earning_ids: Vec<Uuid> },
    DuplicateEffect,
    DuplicateEvent,
    SkippedGifted,
    Reversed { cancelled: usize },
    Ignored,
}

pub struct BillingWebhookUseCase {
    gateway: Arc<dyn BillingEventGateway>,
    dedup_repo: Arc<dyn BillingDedupRepository + Send + Sync>,
    earning_repo: Arc<dyn EarningRepository + Send + Sync>,
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    reversals: Arc<ReversalUseCase>,
    commission_table: CommissionTable,
    hold_policy: HoldPolicy,
}

impl BillingWebhookUseCase {
    pub fn new(
        gateway: Arc<dyn BillingEventGateway>,
        dedup_repo: Arc<dyn BillingDedupRepository + Send + Sync>,
        earning_repo: Arc<dyn EarningRepository + Send + Sync>,
        outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
        reversals: Arc<ReversalUseCase>,
        commission_table: CommissionTable,
        hold_policy: HoldPolicy,
    ) -> Self {
        Self {
            gateway,
            dedup_repo,
            earning_repo,
            outbox_repo,
            reversals,
            commission_table,
            hold_policy,
        }
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<IngestOutcome, BillingWebhookError> {
        let event = self
            .gateway
            .verify_billing_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "billing webhook: signature verification failed");
                BillingWebhookError::InvalidWebhook("signature verification failed".into())
            })?;

        info!(
            event_type = %event.type_,
            event_id = ?event.id,
            "billing webhook: event verified"
        );

        // Cheap event-level short circuit; the payment-level record below
        // is the ground truth.
        if let Some(event_id) = event.id.as_deref() {
            let is_new = self
                .dedup_repo
                .record_event_if_new(event_id)
                .await
                .map_err(BillingWebhookError::Internal)?;
            if !is_new {
                info!(event_id, "billing webhook: event already seen, acknowledging");
                return Ok(IngestOutcome::DuplicateEvent);
            }
        }

        match event.type_.as_str() {
            "invoice.payment_succeeded" => {
                let fact =
                    BillingProviderClient::extract_billing_fact(&event).ok_or_else(|| {
                        warn!("billing webhook: malformed billing object");
                        BillingWebhookError::InvalidWebhook("malformed billing object".into())
                    })?;
                self.process_billing_fact(fact).await
            }
            "customer.subscription.deleted" | "charge.refunded" => {
                let reversal =
                    BillingProviderClient::extract_reversal(&event).ok_or_else(|| {
                        warn!("billing webhook: malformed reversal object");
                        BillingWebhookError::InvalidWebhook("malformed reversal object".into())
                    })?;
                let cancelled = self
                    .reversals
                    .reverse_for_subscription(&reversal.subscription_ref, &reversal.reason, None)
                    .await
                    .map_err(|err| BillingWebhookError::Internal(err.into()))?;
                Ok(IngestOutcome::Reversed { cancelled })
            }
            _ => {
                debug!(event_type = %event.type_, "billing webhook: unhandled event type");
                Ok(IngestOutcome::Ignored)
            }
        }
    }

    /// Applies one billing fact to the ledger exactly once.
    pub async fn process_billing_fact(
        &self,
        fact: BillingFact,
    ) -> Result<IngestOutcome, BillingWebhookError> {
        // Gifted grants never commission, whatever else the fact says.
        if fact.is_gifted {
            info!(
                subscription_ref = %fact.subscription_ref,
                "billing webhook: gifted subscription, no earnings"
            );
            return Ok(IngestOutcome::SkippedGifted);
        }

        let lines = commission::compute_commission_lines(&self.commission_table, &fact).map_err(
            |err| match err {
                CommissionError::MissingPlanRate(plan) => {
                    error!(
                        subscription_ref = %fact.subscription_ref,
                        plan = %plan,
                        "billing webhook: no commission rate configured"
                    );
                    BillingWebhookError::MissingPlanRate(plan)
                }
                other => BillingWebhookError::Internal(anyhow::anyhow!(other.to_string())),
            },
        )?;

        if lines.is_empty() {
            debug!(
                subscription_ref = %fact.subscription_ref,
                "billing webhook: no referrer on record, nothing to credit"
            );
        }

        let now = Utc::now();
        let source = fact.billing_reason.earning_source();
        let mut drafts = Vec::with_capacity(lines.len());
        for line in &lines {
            let origin_earning_id = match fact.billing_reason {
                BillingReason::First => None,
                BillingReason::Renewal => {
                    let origin = self
                        .earning_repo
                        .find_purchase_origin(&fact.subscription_ref, line.beneficiary_user_id)
                        .await
                        .map_err(BillingWebhookError::Internal)?;
                    if origin.is_none() {
                        warn!(
                            subscription_ref = %fact.subscription_ref,
                            beneficiary = %line.beneficiary_user_id,
                            "billing webhook: renewal without a recorded purchase line"
                        );
                    }
                    origin
                }
            };

            drafts.push(InsertEarningEntity {
                id: Uuid::new_v4(),
                beneficiary_user_id: line.beneficiary_user_id,
                referred_user_id: fact.referred_user_id,
                subscription_ref: fact.subscription_ref.clone(),
                source: source.as_str().to_string(),
                origin_earning_id,
                gross_amount_minor: fact.gross_amount_minor,
                commission_rate: line.commission_rate,
                commission_amount_minor: line.commission_amount_minor,
                currency: fact.currency.clone(),
                status: EarningStatus::Pending.as_str().to_string(),
                tier_level: line.tier_level,
                is_gifted: false,
                payment_completed_at: Some(now),
                hold_policy: self.hold_policy.as_str().to_string(),
                hold_period_days: self.hold_policy.days(),
                eligible_for_payout_at: self.hold_policy.eligible_at(now),
            });
        }

        let draft_ids: Vec<Uuid> = drafts.iter().map(|draft| draft.id).collect();
        let payment = InsertProcessedPaymentEntity {
            subscription_ref: fact.subscription_ref.clone(),
            provider_payment_id: fact.provider_payment_id.clone(),
            earning_ids: json!(draft_ids),
        };

        let created = self
            .earning_repo
            .create_for_payment(payment, drafts)
            .await
            .map_err(|err| {
                error!(
                    subscription_ref = %fact.subscription_ref,
                    provider_payment_id = %fact.provider_payment_id,
                    db_error = ?err,
                    "billing webhook: failed to record earnings"
                );
                BillingWebhookError::Internal(err)
            })?;

        let Some(earning_ids) = created else {
            info!(
                subscription_ref = %fact.subscription_ref,
                provider_payment_id = %fact.provider_payment_id,
                "billing webhook: payment already processed, acknowledging"
            );
            return Ok(IngestOutcome::DuplicateEffect);
        };

        info!(
            subscription_ref = %fact.subscription_ref,
            provider_payment_id = %fact.provider_payment_id,
            earning_count = earning_ids.len(),
            "billing webhook: earnings recorded"
        );

        let entries: Vec<InsertLedgerOutboxEntity> = lines
            .iter()
            .zip(&earning_ids)
            .map(|(line, earning_id)| InsertLedgerOutboxEntity {
                topic: "earning.created".to_string(),
                payload: json!({
                    "earning_id": earning_id,
                    "beneficiary_user_id": line.beneficiary_user_id,
                    "tier_level": line.tier_level,
                    "commission_amount_minor": line.commission_amount_minor,
                    "currency": fact.currency,
                    "source": source.as_str(),
                }),
                status: OutboxStatus::Pending.as_str().to_string(),
            })
            .collect();
        if !entries.is_empty() {
            if let Err(err) = self.outbox_repo.enqueue(entries).await {
                warn!(
                    subscription_ref = %fact.subscription_ref,
                    error = ?err,
                    "billing webhook: failed to enqueue earning notifications"
                );
            }
        }

        Ok(IngestOutcome::Created { earning_ids })
    }
}
