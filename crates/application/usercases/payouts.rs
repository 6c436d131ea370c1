use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    billing::payout_gateway::{PayoutDispatchClient, PayoutSubmission},
    domain::{
        entities::{
            earnings::EarningEntity, ledger_outbox::InsertLedgerOutboxEntity,
            payouts::InsertPayoutEntity,
        },
        repositories::{outbox::OutboxRepository, payouts::PayoutRepository},
        value_objects::{
            enums::{outbox_statuses::OutboxStatus, payout_statuses::PayoutStatus},
            payouts::{FeeError, FeeSchedule, MinimumPayoutTable, PayoutDto, PayoutOutcomeEvent},
        },
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayoutDispatchGateway: Send + Sync {
    async fn submit_payout(&self, submission: &PayoutSubmission) -> AnyResult<String>;
}

#[async_trait]
impl PayoutDispatchGateway for PayoutDispatchClient {
    async fn submit_payout(&self, submission: &PayoutSubmission) -> AnyResult<String> {
        self.submit_payout(submission).await
    }
}

#[derive(Debug, Error)]
pub enum PayoutError {
    #[error("no eligible funds to pay out")]
    NoEligibleFunds,
    #[error("eligible balance {balance_minor} is below the {currency} minimum of {minimum_minor}")]
    BelowMinimumPayout {
        balance_minor: i64,
        minimum_minor: i64,
        currency: String,
    },
    #[error("no fee rule configured for payout method '{0}'")]
    MissingFeeRule(String),
    #[error("payout dispatch failed upstream")]
    UpstreamDispatchFailure(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PayoutError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            PayoutError::NoEligibleFunds | PayoutError::BelowMinimumPayout { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PayoutError::MissingFeeRule(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PayoutError::UpstreamDispatchFailure(_) => StatusCode::BAD_GATEWAY,
            PayoutError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// How an asynchronous dispatch outcome landed. Stale or duplicate
/// notifications are acknowledged without effect.
#[derive(Debug, PartialEq)]
pub enum OutcomeApplication {
    Applied(PayoutStatus),
    Ignored,
}

pub struct PayoutUseCase {
    payout_repo: Arc<dyn PayoutRepository + Send + Sync>,
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    gateway: Arc<dyn PayoutDispatchGateway>,
    fees: FeeSchedule,
    minimums: MinimumPayoutTable,
}

impl PayoutUseCase {
    pub fn new(
        payout_repo: Arc<dyn PayoutRepository + Send + Sync>,
        outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
        gateway: Arc<dyn PayoutDispatchGateway>,
        fees: FeeSchedule,
        minimums: MinimumPayoutTable,
    ) -> Self {
        Self {
            payout_repo,
            outbox_repo,
            gateway,
            fees,
            minimums,
        }
    }

    /// Batches the beneficiary's eligible earnings into one payout request
    /// and submits it for dispatch.
    pub async fn request_payout(
        &self,
        beneficiary_user_id: Uuid,
        destination_account_ref: String,
        method: String,
        min_amount_override: Option<i64>,
    ) -> Result<PayoutDto, PayoutError> {
        let now = Utc::now();
        info!(
            %beneficiary_user_id,
            method = %method,
            "payouts: payout requested"
        );

        let pool = self
            .payout_repo
            .eligible_earnings(beneficiary_user_id, now)
            .await
            .map_err(|err| {
                error!(
                    %beneficiary_user_id,
                    db_error = ?err,
                    "payouts: failed to load eligible earnings"
                );
                PayoutError::Internal(err)
            })?;

        let Some(first) = pool.first() else {
            info!(%beneficiary_user_id, "payouts: no eligible earnings");
            return Err(PayoutError::NoEligibleFunds);
        };

        // One payout is single-currency; FIFO order decides which currency
        // goes first when a beneficiary holds several.
        let currency = first.currency.clone();
        let selected: Vec<&EarningEntity> =
            pool.iter().filter(|e| e.currency == currency).collect();
        let amount_minor: i64 = selected.iter().map(|e| e.commission_amount_minor).sum();
        let earning_ids: Vec<Uuid> = selected.iter().map(|e| e.id).collect();

        let minimum_minor = self
            .minimums
            .minimum_for(&currency)
            .max(min_amount_override.unwrap_or(0));
        if amount_minor < minimum_minor {
            info!(
                %beneficiary_user_id,
                amount_minor,
                minimum_minor,
                currency = %currency,
                "payouts: balance below minimum"
            );
            return Err(PayoutError::BelowMinimumPayout {
                balance_minor: amount_minor,
                minimum_minor,
                currency,
            });
        }

        let fee_minor = self
            .fees
            .fee_for(&method, amount_minor)
            .map_err(|err| match err {
                FeeError::MissingMethod(method) => PayoutError::MissingFeeRule(method),
                other => PayoutError::Internal(anyhow::anyhow!(other.to_string())),
            })?;
        let net_amount_minor = amount_minor - fee_minor;
        if net_amount_minor <= 0 {
            return Err(PayoutError::BelowMinimumPayout {
                balance_minor: amount_minor,
                minimum_minor: fee_minor,
                currency,
            });
        }

        let payout_id = Uuid::new_v4();
        let insert = InsertPayoutEntity {
            id: payout_id,
            beneficiary_user_id,
            destination_account_ref: destination_account_ref.clone(),
            method: method.clone(),
            amount_minor,
            fee_minor,
            net_amount_minor,
            currency: currency.clone(),
            status: PayoutStatus::Pending.as_str().to_string(),
        };

        let linked = self
            .payout_repo
            .create_with_links(insert, earning_ids.clone())
            .await
            .map_err(|err| {
                error!(
                    %beneficiary_user_id,
                    db_error = ?err,
                    "payouts: failed to create payout"
                );
                PayoutError::Internal(err)
            })?;
        if !linked {
            warn!(
                %beneficiary_user_id,
                "payouts: eligible pool changed underneath us, nothing created"
            );
            return Err(PayoutError::NoEligibleFunds);
        }

        info!(
            %beneficiary_user_id,
            %payout_id,
            amount_minor,
            fee_minor,
            earning_count = earning_ids.len(),
            currency = %currency,
            "payouts: payout created and linked"
        );

        let submission = PayoutSubmission {
            payout_id,
            destination_account_ref,
            method,
            net_amount_minor,
            currency: currency.clone(),
        };
        let provider_payout_id = match self.gateway.submit_payout(&submission).await {
            Ok(id) => id,
            Err(err) => {
                error!(
                    %payout_id,
                    error = ?err,
                    "payouts: dispatch submission failed, releasing earnings"
                );
                if let Err(release_err) = self
                    .payout_repo
                    .mark_released_terminal(
                        payout_id,
                        PayoutStatus::Cancelled.as_str(),
                        Some("dispatch_error".to_string()),
                        Some(err.to_string()),
                        Utc::now(),
                    )
                    .await
                {
                    error!(
                        %payout_id,
                        db_error = ?release_err,
                        "payouts: failed to release earnings after dispatch failure"
                    );
                }
                return Err(PayoutError::UpstreamDispatchFailure(err));
            }
        };

        let marked = self
            .payout_repo
            .mark_processing(payout_id, &provider_payout_id, Utc::now())
            .await
            .map_err(PayoutError::Internal)?;
        if marked == 0 {
            // An outcome webhook beat us to it; the guarded update lost, as
            // intended.
            warn!(%payout_id, "payouts: payout advanced before processing mark");
        }

        self.notify(
            "payout.requested",
            json!({
                "payout_id": payout_id,
                "beneficiary_user_id": beneficiary_user_id,
                "amount_minor": amount_minor,
                "net_amount_minor": net_amount_minor,
                "currency": currency,
            }),
        )
        .await;

        let entity = self
            .payout_repo
            .find_by_id(payout_id)
            .await
            .map_err(PayoutError::Internal)?
            .ok_or_else(|| PayoutError::Internal(anyhow::anyhow!("payout vanished after create")))?;

        Ok(PayoutDto::from_entity(entity, earning_ids.len() as i64))
    }

    /// Applies a provider outcome notification, whenever and in whatever
    /// order it arrives. Every transition is a guarded update; a guard
    /// matching zero rows means the notification is stale.
    pub async fn handle_dispatch_outcome(
        &self,
        outcome: PayoutOutcomeEvent,
    ) -> Result<OutcomeApplication, PayoutError> {
        let payout = self
            .payout_repo
            .find_by_provider_id(&outcome.provider_payout_id)
            .await
            .map_err(PayoutError::Internal)?;
        let Some(payout) = payout else {
            warn!(
                provider_payout_id = %outcome.provider_payout_id,
                "payouts: outcome for unknown payout, acknowledging"
            );
            return Ok(OutcomeApplication::Ignored);
        };

        let now = Utc::now();
        let rows = match outcome.status {
            PayoutStatus::Pending => 0,
            PayoutStatus::Processing => {
                self.payout_repo
                    .mark_processing(payout.id, &outcome.provider_payout_id, now)
                    .await
                    .map_err(PayoutError::Internal)?
            }
            PayoutStatus::InTransit => self
                .payout_repo
                .mark_in_transit(payout.id, now)
                .await
                .map_err(PayoutError::Internal)?,
            PayoutStatus::Paid => self
                .payout_repo
                .mark_paid(payout.id, now)
                .await
                .map_err(PayoutError::Internal)?,
            PayoutStatus::Failed | PayoutStatus::Cancelled | PayoutStatus::Returned => self
                .payout_repo
                .mark_released_terminal(
                    payout.id,
                    outcome.status.as_str(),
                    outcome.failure_code.clone(),
                    outcome.failure_message.clone(),
                    now,
                )
                .await
                .map_err(PayoutError::Internal)?,
        };

        if rows == 0 {
            info!(
                payout_id = %payout.id,
                status = %outcome.status,
                "payouts: stale or duplicate outcome, no transition"
            );
            return Ok(OutcomeApplication::Ignored);
        }

        info!(
            payout_id = %payout.id,
            status = %outcome.status,
            failure_code = ?outcome.failure_code,
            "payouts: dispatch outcome applied"
        );

        self.notify(
            &format!("payout.{}", outcome.status),
            json!({
                "payout_id": payout.id,
                "beneficiary_user_id": payout.beneficiary_user_id,
                "status": outcome.status,
                "failure_code": outcome.failure_code,
            }),
        )
        .await;

        Ok(OutcomeApplication::Applied(outcome.status))
    }

    pub async fn history(&self, beneficiary_user_id: Uuid) -> Result<Vec<PayoutDto>, PayoutError> {
        let rows = self
            .payout_repo
            .history_for_beneficiary(beneficiary_user_id)
            .await
            .map_err(PayoutError::Internal)?;
        Ok(rows
            .into_iter()
            .map(|(entity, count)| PayoutDto::from_entity(entity, count))
            .collect())
    }

    async fn notify(&self, topic: &str, payload: serde_json::Value) {
        let entry = InsertLedgerOutboxEntity {
            topic: topic.to_string(),
            payload,
            status: OutboxStatus::Pending.as_str().to_string(),
        };
        if let Err(err) = self.outbox_repo.enqueue(vec![entry]).await {
            warn!(topic, error = ?err, "payouts: failed to enqueue notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::payouts::PayoutEntity,
        repositories::{outbox::MockOutboxRepository, payouts::MockPayoutRepository},
    };
    use chrono::Duration;
    use std::collections::HashMap;

    fn fees() -> FeeSchedule {
        FeeSchedule::new(HashMap::from([(
            "bank_transfer".to_string(),
            crate::domain::value_objects::payouts::FeeRule {
                flat_minor: 30,
                percent: "0".parse().unwrap(),
            },
        )]))
    }

    fn minimums() -> MinimumPayoutTable {
        MinimumPayoutTable::new(HashMap::from([("USD".to_string(), 500)]))
    }

    fn approved_earning(
        beneficiary: Uuid,
        amount: i64,
        currency: &str,
        age_days: i64,
    ) -> EarningEntity {
        let now = Utc::now();
        EarningEntity {
            id: Uuid::new_v4(),
            beneficiary_user_id: beneficiary,
            referred_user_id: Uuid::new_v4(),
            subscription_ref: "sub_42".to_string(),
            source: "purchase".to_string(),
            origin_earning_id: None,
            gross_amount_minor: amount * 10,
            commission_rate: "0.10".parse().unwrap(),
            commission_amount_minor: amount,
            currency: currency.to_string(),
            status: "approved".to_string(),
            tier_level: 1,
            is_gifted: false,
            payment_completed_at: Some(now - Duration::days(age_days)),
            hold_policy: "timed".to_string(),
            hold_period_days: 30,
            eligible_for_payout_at: now - Duration::days(age_days - 30),
            approved_at: Some(now - Duration::days(1)),
            approved_by: None,
            paid_at: None,
            disputed_at: None,
            disputed_by: None,
            disputed_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            cancelled_reason: None,
            payout_id: None,
            created_at: now - Duration::days(age_days),
            updated_at: now - Duration::days(1),
        }
    }

    fn payout_entity(id: Uuid, beneficiary: Uuid, amount: i64, status: &str) -> PayoutEntity {
        PayoutEntity {
            id,
            beneficiary_user_id: beneficiary,
            destination_account_ref: "acct_1".to_string(),
            method: "bank_transfer".to_string(),
            amount_minor: amount,
            fee_minor: 30,
            net_amount_minor: amount - 30,
            currency: "USD".to_string(),
            status: status.to_string(),
            provider_payout_id: Some("po_9".to_string()),
            failure_code: None,
            failure_message: None,
            requested_at: Utc::now(),
            processed_at: None,
            paid_at: None,
            failed_at: None,
        }
    }

    fn usecase(
        payout_repo: MockPayoutRepository,
        outbox_repo: MockOutboxRepository,
        gateway: MockPayoutDispatchGateway,
    ) -> PayoutUseCase {
        PayoutUseCase::new(
            Arc::new(payout_repo),
            Arc::new(outbox_repo),
            Arc::new(gateway),
            fees(),
            minimums(),
        )
    }

    #[tokio::test]
    async fn batches_two_earnings_into_one_payout() {
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();
        let mut gateway = MockPayoutDispatchGateway::new();

        payout_repo.expect_eligible_earnings().returning(move |_, _| {
            Ok(vec![
                approved_earning(beneficiary, 500, "USD", 40),
                approved_earning(beneficiary, 300, "USD", 35),
            ])
        });
        payout_repo
            .expect_create_with_links()
            .withf(|payout, earning_ids| {
                payout.amount_minor == 800
                    && payout.fee_minor == 30
                    && payout.net_amount_minor == 770
                    && payout.status == "pending"
                    && earning_ids.len() == 2
            })
            .times(1)
            .returning(|_, _| Ok(true));
        gateway
            .expect_submit_payout()
            .times(1)
            .returning(|_| Ok("po_9".to_string()));
        payout_repo
            .expect_mark_processing()
            .times(1)
            .returning(|_, _, _| Ok(1));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));
        payout_repo.expect_find_by_id().returning(move |id| {
            Ok(Some(payout_entity(id, beneficiary, 800, "processing")))
        });

        let dto = usecase(payout_repo, outbox_repo, gateway)
            .request_payout(
                beneficiary,
                "acct_1".to_string(),
                "bank_transfer".to_string(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(dto.amount_minor, 800);
        assert_eq!(dto.earning_count, 2);
    }

    #[tokio::test]
    async fn only_the_oldest_currency_is_batched() {
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();
        let mut gateway = MockPayoutDispatchGateway::new();

        payout_repo.expect_eligible_earnings().returning(move |_, _| {
            Ok(vec![
                approved_earning(beneficiary, 700, "USD", 50),
                approved_earning(beneficiary, 900, "THB", 45),
                approved_earning(beneficiary, 400, "USD", 40),
            ])
        });
        payout_repo
            .expect_create_with_links()
            .withf(|payout, earning_ids| {
                payout.currency == "USD" && payout.amount_minor == 1100 && earning_ids.len() == 2
            })
            .times(1)
            .returning(|_, _| Ok(true));
        gateway
            .expect_submit_payout()
            .returning(|_| Ok("po_9".to_string()));
        payout_repo
            .expect_mark_processing()
            .returning(|_, _, _| Ok(1));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));
        payout_repo.expect_find_by_id().returning(move |id| {
            Ok(Some(payout_entity(id, beneficiary, 1100, "processing")))
        });

        usecase(payout_repo, outbox_repo, gateway)
            .request_payout(
                beneficiary,
                "acct_1".to_string(),
                "bank_transfer".to_string(),
                None,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_pool_refuses_with_no_eligible_funds() {
        let mut payout_repo = MockPayoutRepository::new();
        payout_repo
            .expect_eligible_earnings()
            .returning(|_, _| Ok(Vec::new()));

        let err = usecase(
            payout_repo,
            MockOutboxRepository::new(),
            MockPayoutDispatchGateway::new(),
        )
        .request_payout(
            Uuid::new_v4(),
            "acct_1".to_string(),
            "bank_transfer".to_string(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PayoutError::NoEligibleFunds));
    }

    #[tokio::test]
    async fn below_minimum_is_refused_without_creating_anything() {
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        payout_repo
            .expect_eligible_earnings()
            .returning(move |_, _| Ok(vec![approved_earning(beneficiary, 300, "USD", 40)]));

        let err = usecase(
            payout_repo,
            MockOutboxRepository::new(),
            MockPayoutDispatchGateway::new(),
        )
        .request_payout(
            beneficiary,
            "acct_1".to_string(),
            "bank_transfer".to_string(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            PayoutError::BelowMinimumPayout {
                balance_minor: 300,
                minimum_minor: 500,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn dispatch_failure_releases_the_batch() {
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        let mut gateway = MockPayoutDispatchGateway::new();

        payout_repo
            .expect_eligible_earnings()
            .returning(move |_, _| Ok(vec![approved_earning(beneficiary, 800, "USD", 40)]));
        payout_repo
            .expect_create_with_links()
            .returning(|_, _| Ok(true));
        gateway
            .expect_submit_payout()
            .returning(|_| Err(anyhow::anyhow!("provider unavailable")));
        payout_repo
            .expect_mark_released_terminal()
            .withf(|_, status, failure_code, _, _| {
                status == "cancelled" && failure_code.as_deref() == Some("dispatch_error")
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(1));

        let err = usecase(payout_repo, MockOutboxRepository::new(), gateway)
            .request_payout(
                beneficiary,
                "acct_1".to_string(),
                "bank_transfer".to_string(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PayoutError::UpstreamDispatchFailure(_)));
    }

    #[tokio::test]
    async fn failed_outcome_releases_earnings() {
        let payout_id = Uuid::new_v4();
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        payout_repo
            .expect_find_by_provider_id()
            .returning(move |_| {
                Ok(Some(payout_entity(payout_id, beneficiary, 800, "in_transit")))
            });
        payout_repo
            .expect_mark_released_terminal()
            .withf(move |id, status, failure_code, _, _| {
                *id == payout_id
                    && status == "failed"
                    && failure_code.as_deref() == Some("account_closed")
            })
            .times(1)
            .returning(|_, _, _, _, _| Ok(1));
        outbox_repo
            .expect_enqueue()
            .withf(|entries| entries[0].topic == "payout.failed")
            .times(1)
            .returning(|_| Ok(()));

        let application = usecase(payout_repo, outbox_repo, MockPayoutDispatchGateway::new())
            .handle_dispatch_outcome(PayoutOutcomeEvent {
                provider_payout_id: "po_9".to_string(),
                status: PayoutStatus::Failed,
                failure_code: Some("account_closed".to_string()),
                failure_message: Some("destination account closed".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(application, OutcomeApplication::Applied(PayoutStatus::Failed));
    }

    #[tokio::test]
    async fn paid_outcome_marks_earnings_paid() {
        let payout_id = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        payout_repo
            .expect_find_by_provider_id()
            .returning(move |_| {
                Ok(Some(payout_entity(payout_id, Uuid::new_v4(), 800, "in_transit")))
            });
        payout_repo
            .expect_mark_paid()
            .times(1)
            .returning(|_, _| Ok(1));
        outbox_repo.expect_enqueue().returning(|_| Ok(()));

        let application = usecase(payout_repo, outbox_repo, MockPayoutDispatchGateway::new())
            .handle_dispatch_outcome(PayoutOutcomeEvent {
                provider_payout_id: "po_9".to_string(),
                status: PayoutStatus::Paid,
                failure_code: None,
                failure_message: None,
            })
            .await
            .unwrap();
        assert_eq!(application, OutcomeApplication::Applied(PayoutStatus::Paid));
    }

    #[tokio::test]
    async fn stale_outcome_is_acknowledged_without_effect() {
        let payout_id = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();

        payout_repo
            .expect_find_by_provider_id()
            .returning(move |_| Ok(Some(payout_entity(payout_id, Uuid::new_v4(), 800, "paid"))));
        payout_repo
            .expect_mark_in_transit()
            .times(1)
            .returning(|_, _| Ok(0));

        let application = usecase(
            payout_repo,
            MockOutboxRepository::new(),
            MockPayoutDispatchGateway::new(),
        )
        .handle_dispatch_outcome(PayoutOutcomeEvent {
            provider_payout_id: "po_9".to_string(),
            status: PayoutStatus::InTransit,
            failure_code: None,
            failure_message: None,
        })
        .await
        .unwrap();
        assert_eq!(application, OutcomeApplication::Ignored);
    }

    #[tokio::test]
    async fn unknown_provider_payout_is_acknowledged() {
        let mut payout_repo = MockPayoutRepository::new();
        payout_repo
            .expect_find_by_provider_id()
            .returning(|_| Ok(None));

        let application = usecase(
            payout_repo,
            MockOutboxRepository::new(),
            MockPayoutDispatchGateway::new(),
        )
        .handle_dispatch_outcome(PayoutOutcomeEvent {
            provider_payout_id: "po_unknown".to_string(),
            status: PayoutStatus::Paid,
            failure_code: None,
            failure_message: None,
        })
        .await
        .unwrap();
        assert_eq!(application, OutcomeApplication::Ignored);
    }

    #[tokio::test]
    async fn history_carries_earning_counts() {
        let beneficiary = Uuid::new_v4();
        let mut payout_repo = MockPayoutRepository::new();
        payout_repo
            .expect_history_for_beneficiary()
            .returning(move |_| {
                Ok(vec![(payout_entity(Uuid::new_v4(), beneficiary, 800, "paid"), 2)])
            });

        let history = usecase(
            payout_repo,
            MockOutboxRepository::new(),
            MockPayoutDispatchGateway::new(),
        )
        .history(beneficiary)
        .await
        .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].earning_count, 2);
        assert_eq!(history[0].status, PayoutStatus::Paid);
    }
}
