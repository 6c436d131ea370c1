use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::{
    earnings::EarningEntity,
    payouts::{InsertPayoutEntity, PayoutEntity},
};

#[automock]
#[async_trait]
pub trait PayoutRepository {
    /// Approved, unlinked, past-eligibility earnings for the beneficiary,
    /// oldest first.
    async fn eligible_earnings(
        &self,
        beneficiary_user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<EarningEntity>>;

    /// Inserts the payout and links the selected earnings in one
    /// transaction. Returns `false` (and writes nothing) when a concurrent
    /// request already claimed part of the selection.
    async fn create_with_links(
        &self,
        payout: InsertPayoutEntity,
        earning_ids: Vec<Uuid>,
    ) -> Result<bool>;

    async fn find_by_id(&self, payout_id: Uuid) -> Result<Option<PayoutEntity>>;

    async fn find_by_provider_id(&self, provider_payout_id: &str)
    -> Result<Option<PayoutEntity>>;

    async fn history_for_beneficiary(
        &self,
        beneficiary_user_id: Uuid,
    ) -> Result<Vec<(PayoutEntity, i64)>>;

    async fn linked_earning_count(&self, payout_id: Uuid) -> Result<i64>;

    /// `pending -> processing`, stamping the provider's payout id.
    async fn mark_processing(
        &self,
        payout_id: Uuid,
        provider_payout_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize>;

    /// `processing -> in_transit` (also accepts `pending` for providers
    /// that skip the processing notification).
    async fn mark_in_transit(&self, payout_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Any non-terminal state -> `paid`; linked earnings become `paid` in
    /// the same transaction.
    async fn mark_paid(&self, payout_id: Uuid, now: DateTime<Utc>) -> Result<usize>;

    /// Any non-terminal state -> `failed`/`cancelled`/`returned`; linked
    /// earnings are released back to the approved pool in the same
    /// transaction.
    async fn mark_released_terminal(
        &self,
        payout_id: Uuid,
        status: &str,
        failure_code: Option<String>,
        failure_message: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<usize>;
}
