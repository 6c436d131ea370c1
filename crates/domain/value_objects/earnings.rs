use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::earnings::EarningEntity,
    value_objects::{
        commission::HoldPolicy,
        enums::{earning_sources::EarningSource, earning_statuses::EarningStatus},
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningDto {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub referred_user_id: Uuid,
    pub subscription_ref: String,
    pub source: EarningSource,
    pub origin_earning_id: Option<Uuid>,
    pub gross_amount_minor: i64,
    pub commission_rate: Decimal,
    pub commission_amount_minor: i64,
    pub currency: String,
    pub status: EarningStatus,
    pub tier_level: i32,
    pub hold_policy: HoldPolicy,
    pub payment_completed_at: Option<DateTime<Utc>>,
    pub eligible_for_payout_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub disputed_at: Option<DateTime<Utc>>,
    pub disputed_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_reason: Option<String>,
    pub payout_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<EarningEntity> for EarningDto {
    fn from(entity: EarningEntity) -> Self {
        Self {
            id: entity.id,
            beneficiary_user_id: entity.beneficiary_user_id,
            referred_user_id: entity.referred_user_id,
            subscription_ref: entity.subscription_ref,
            source: EarningSource::from_str(&entity.source).unwrap_or(EarningSource::Purchase),
            origin_earning_id: entity.origin_earning_id,
            gross_amount_minor: entity.gross_amount_minor,
            commission_rate: entity.commission_rate,
            commission_amount_minor: entity.commission_amount_minor,
            currency: entity.currency,
            status: EarningStatus::from_str(&entity.status).unwrap_or(EarningStatus::Pending),
            tier_level: entity.tier_level,
            hold_policy: HoldPolicy::from_columns(&entity.hold_policy, entity.hold_period_days),
            payment_completed_at: entity.payment_completed_at,
            eligible_for_payout_at: entity.eligible_for_payout_at,
            approved_at: entity.approved_at,
            paid_at: entity.paid_at,
            disputed_at: entity.disputed_at,
            disputed_reason: entity.disputed_reason,
            cancelled_at: entity.cancelled_at,
            cancelled_reason: entity.cancelled_reason,
            payout_id: entity.payout_id,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EarningFilter {
    pub status: Option<EarningStatus>,
    pub source: Option<EarningSource>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Count and sum of commission amounts for one status bucket.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBucket {
    pub count: i64,
    pub total_minor: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EarningsSummaryDto {
    pub pending: StatusBucket,
    pub approved: StatusBucket,
    pub paid: StatusBucket,
    pub disputed: StatusBucket,
    pub cancelled: StatusBucket,
}

impl EarningsSummaryDto {
    pub fn apply(&mut self, status: EarningStatus, bucket: StatusBucket) {
        match status {
            EarningStatus::Pending => self.pending = bucket,
            EarningStatus::Approved => self.approved = bucket,
            EarningStatus::Paid => self.paid = bucket,
            EarningStatus::Disputed => self.disputed = bucket,
            EarningStatus::Cancelled => self.cancelled = bucket,
        }
    }
}

/// One `(status, count, sum)` aggregation row, as read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub status: String,
    pub count: i64,
    pub total_minor: i64,
}

/// One row matured by a hold-period sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct MaturedEarning {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub commission_amount_minor: i64,
    pub currency: String,
}
