use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{
    entities::ledger_outbox::InsertLedgerOutboxEntity,
    repositories::{earnings::EarningRepository, outbox::OutboxRepository},
    value_objects::enums::outbox_statuses::OutboxStatus,
};

#[derive(Debug, Error)]
pub enum ReversalError {
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ReversalError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Unwinds commissions for a subscription when the upstream grant is
/// cancelled, refunded or deauthorized. Re-invoking for an already
/// reversed subscription matches zero rows and is a no-op.
pub struct ReversalUseCase {
    earning_repo: Arc<dyn EarningRepository + Send + Sync>,
    outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
}

impl ReversalUseCase {
    pub fn new(
        earning_repo: Arc<dyn EarningRepository + Send + Sync>,
        outbox_repo: Arc<dyn OutboxRepository + Send + Sync>,
    ) -> Self {
        Self {
            earning_repo,
            outbox_repo,
        }
    }

    pub async fn reverse_for_subscription(
        &self,
        subscription_ref: &str,
        reason: &str,
        actor: Option<Uuid>,
    ) -> Result<usize, ReversalError> {
        let now = Utc::now();
        info!(
            subscription_ref,
            reason, "reversals: cancelling earnings for subscription"
        );

        let cancelled = self
            .earning_repo
            .cancel_for_subscription(subscription_ref, reason, actor, now)
            .await
            .map_err(|err| {
                error!(
                    subscription_ref,
                    db_error = ?err,
                    "reversals: failed to cancel earnings"
                );
                ReversalError::Internal(err)
            })?;

        if cancelled == 0 {
            info!(subscription_ref, "reversals: nothing left to cancel");
            return Ok(0);
        }

        info!(subscription_ref, cancelled, "reversals: earnings cancelled");

        let entry = InsertLedgerOutboxEntity {
            topic: "earnings.reversed".to_string(),
            payload: json!({
                "subscription_ref": subscription_ref,
                "reason": reason,
                "cancelled": cancelled,
            }),
            status: OutboxStatus::Pending.as_str().to_string(),
        };
        if let Err(err) = self.outbox_repo.enqueue(vec![entry]).await {
            warn!(
                subscription_ref,
                error = ?err,
                "reversals: failed to enqueue reversal notification"
            );
        }

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{
        earnings::MockEarningRepository, outbox::MockOutboxRepository,
    };
    use mockall::predicate::{always, eq};

    #[tokio::test]
    async fn cancels_open_earnings_and_notifies() {
        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_cancel_for_subscription()
            .with(eq("sub_42"), eq("charge_refunded"), eq(None), always())
            .times(1)
            .returning(|_, _, _, _| Ok(3));
        outbox_repo
            .expect_enqueue()
            .withf(|entries| entries.len() == 1 && entries[0].topic == "earnings.reversed")
            .times(1)
            .returning(|_| Ok(()));

        let usecase = ReversalUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let cancelled = usecase
            .reverse_for_subscription("sub_42", "charge_refunded", None)
            .await
            .unwrap();
        assert_eq!(cancelled, 3);
    }

    #[tokio::test]
    async fn second_reversal_is_a_noop() {
        let mut earning_repo = MockEarningRepository::new();
        let outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_cancel_for_subscription()
            .times(1)
            .returning(|_, _, _, _| Ok(0));

        let usecase = ReversalUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        let cancelled = usecase
            .reverse_for_subscription("sub_42", "subscription_cancelled", None)
            .await
            .unwrap();
        assert_eq!(cancelled, 0);
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_the_reversal() {
        let mut earning_repo = MockEarningRepository::new();
        let mut outbox_repo = MockOutboxRepository::new();

        earning_repo
            .expect_cancel_for_subscription()
            .times(1)
            .returning(|_, _, _, _| Ok(1));
        outbox_repo
            .expect_enqueue()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("outbox unavailable")));

        let usecase = ReversalUseCase::new(Arc::new(earning_repo), Arc::new(outbox_repo));
        assert_eq!(
            usecase
                .reverse_for_subscription("sub_42", "deauthorized", None)
                .await
                .unwrap(),
            1
        );
    }
}
