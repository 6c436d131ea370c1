use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    entities::payouts::PayoutEntity,
    value_objects::enums::payout_statuses::PayoutStatus,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutDto {
    pub id: Uuid,
    pub beneficiary_user_id: Uuid,
    pub destination_account_ref: String,
    pub method: String,
    pub amount_minor: i64,
    pub fee_minor: i64,
    pub net_amount_minor: i64,
    pub currency: String,
    pub status: PayoutStatus,
    pub earning_count: i64,
    pub provider_payout_id: Option<String>,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl PayoutDto {
    pub fn from_entity(entity: PayoutEntity, earning_count: i64) -> Self {
        Self {
            id: entity.id,
            beneficiary_user_id: entity.beneficiary_user_id,
            destination_account_ref: entity.destination_account_ref,
            method: entity.method,
            amount_minor: entity.amount_minor,
            fee_minor: entity.fee_minor,
            net_amount_minor: entity.net_amount_minor,
            currency: entity.currency,
            status: PayoutStatus::from_str(&entity.status).unwrap_or(PayoutStatus::Pending),
            earning_count,
            provider_payout_id: entity.provider_payout_id,
            failure_code: entity.failure_code,
            failure_message: entity.failure_message,
            requested_at: entity.requested_at,
            processed_at: entity.processed_at,
            paid_at: entity.paid_at,
            failed_at: entity.failed_at,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FeeError {
    #[error("no fee rule configured for payout method '{0}'")]
    MissingMethod(String),
    #[error("fee out of range for amount {0}")]
    AmountOutOfRange(i64),
}

/// Flat component plus a percentage of the payout amount, floored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeRule {
    pub flat_minor: i64,
    pub percent: Decimal,
}

/// Per-method payout fee schedule.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    rules: HashMap<String, FeeRule>,
}

impl FeeSchedule {
    pub fn new(rules: HashMap<String, FeeRule>) -> Self {
        Self { rules }
    }

    pub fn fee_for(&self, method: &str, amount_minor: i64) -> Result<i64, FeeError> {
        let rule = self
            .rules
            .get(method)
            .ok_or_else(|| FeeError::MissingMethod(method.to_string()))?;

        let percentage = (Decimal::from(amount_minor) * rule.percent)
            .floor()
            .to_i64()
            .ok_or(FeeError::AmountOutOfRange(amount_minor))?;

        Ok(rule.flat_minor + percentage)
    }
}

/// Currency-keyed minimum payout amounts; below-minimum requests are refused.
#[derive(Debug, Clone)]
pub struct MinimumPayoutTable {
    minimums: HashMap<String, i64>,
}

impl MinimumPayoutTable {
    pub fn new(minimums: HashMap<String, i64>) -> Self {
        Self { minimums }
    }

    pub fn minimum_for(&self, currency: &str) -> i64 {
        self.minimums.get(currency).copied().unwrap_or(0)
    }
}

/// Dispatch outcome reported by the payout provider, possibly long after
/// the request that created the payout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayoutOutcomeEvent {
    pub provider_payout_id: String,
    pub status: PayoutStatus,
    pub failure_code: Option<String>,
    pub failure_message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule() -> FeeSchedule {
        let mut rules = HashMap::new();
        rules.insert(
            "bank_transfer".to_string(),
            FeeRule {
                flat_minor: 30,
                percent: "0.0025".parse().unwrap(),
            },
        );
        rules.insert(
            "paypal".to_string(),
            FeeRule {
                flat_minor: 0,
                percent: "0.02".parse().unwrap(),
            },
        );
        FeeSchedule::new(rules)
    }

    #[test]
    fn flat_plus_floored_percentage() {
        // 80000 * 0.0025 = 200, plus 30 flat.
        assert_eq!(schedule().fee_for("bank_transfer", 80_000).unwrap(), 230);
        // 999 * 0.02 = 19.98 -> 19.
        assert_eq!(schedule().fee_for("paypal", 999).unwrap(), 19);
    }

    #[test]
    fn unknown_method_is_an_error() {
        assert_eq!(
            schedule().fee_for("carrier_pigeon", 1_000).unwrap_err(),
            FeeError::MissingMethod("carrier_pigeon".to_string())
        );
    }

    #[test]
    fn minimum_defaults_to_zero_for_unknown_currency() {
        let minimums = MinimumPayoutTable::new(HashMap::from([("USD".to_string(), 2_500)]));
        assert_eq!(minimums.minimum_for("USD"), 2_500);
        assert_eq!(minimums.minimum_for("THB"), 0);
    }
}
