use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::billing_facts::BillingFact;

/// Tier-1 is the direct referrer, tier-2 the referrer's own referrer.
pub const MAX_TIER_DEPTH: usize = 2;

pub const DEFAULT_HOLD_PERIOD_DAYS: i32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum CommissionError {
    #[error("no commission rate configured for plan '{0}'")]
    MissingPlanRate(String),
    #[error("commission amount out of range for gross {0}")]
    AmountOutOfRange(i64),
}

/// Plan-keyed commission rates plus the fixed sub-affiliate share.
///
/// A plan missing from the table is a configuration error and never
/// falls back to a zero rate.
#[derive(Debug, Clone)]
pub struct CommissionTable {
    plan_rates: HashMap<String, Decimal>,
    sub_affiliate_rate: Decimal,
}

impl CommissionTable {
    pub fn new(plan_rates: HashMap<String, Decimal>, sub_affiliate_rate: Decimal) -> Self {
        Self {
            plan_rates,
            sub_affiliate_rate,
        }
    }

    pub fn plan_rate(&self, plan: &str) -> Result<Decimal, CommissionError> {
        self.plan_rates
            .get(plan)
            .copied()
            .ok_or_else(|| CommissionError::MissingPlanRate(plan.to_string()))
    }

    pub fn sub_affiliate_rate(&self) -> Decimal {
        self.sub_affiliate_rate
    }
}

/// Whether a line must sit out the maturation window before payout.
///
/// `Waived` is a deliberate state, not an absent column: the line becomes
/// eligible the moment its payment completes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HoldPolicy {
    Timed(i32),
    Waived,
}

impl HoldPolicy {
    pub fn days(&self) -> i32 {
        match self {
            HoldPolicy::Timed(days) => *days,
            HoldPolicy::Waived => 0,
        }
    }

    pub fn eligible_at(&self, payment_completed_at: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            HoldPolicy::Timed(days) => payment_completed_at + Duration::days((*days).into()),
            HoldPolicy::Waived => payment_completed_at,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldPolicy::Timed(_) => "timed",
            HoldPolicy::Waived => "waived",
        }
    }

    pub fn from_columns(policy: &str, days: i32) -> Self {
        match policy {
            "waived" => HoldPolicy::Waived,
            _ => HoldPolicy::Timed(days),
        }
    }
}

/// One commission line computed from a billing fact, before persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct CommissionLine {
    pub beneficiary_user_id: Uuid,
    pub tier_level: i32,
    pub commission_rate: Decimal,
    pub commission_amount_minor: i64,
}

/// Walks the beneficiary chain and computes one commission line per tier.
///
/// Level 0 takes its share of the gross amount at the plan rate; every
/// deeper level takes the sub-affiliate share of the *previous level's
/// commission*, not of the gross. Gifted subscriptions yield no lines at
/// all. Each multiplication floors to integer minor units.
pub fn compute_commission_lines(
    table: &CommissionTable,
    fact: &BillingFact,
) -> Result<Vec<CommissionLine>, CommissionError> {
    if fact.is_gifted {
        return Ok(Vec::new());
    }

    let mut lines = Vec::new();
    let mut basis_minor = fact.gross_amount_minor;

    for (level, beneficiary) in fact.beneficiary_chain.iter().take(MAX_TIER_DEPTH).enumerate() {
        let rate = if level == 0 {
            table.plan_rate(&fact.plan)?
        } else {
            table.sub_affiliate_rate()
        };

        let amount_minor = floor_minor(basis_minor, rate)
            .ok_or(CommissionError::AmountOutOfRange(fact.gross_amount_minor))?;

        lines.push(CommissionLine {
            beneficiary_user_id: *beneficiary,
            tier_level: (level + 1) as i32,
            commission_rate: rate,
            commission_amount_minor: amount_minor,
        });

        basis_minor = amount_minor;
    }

    Ok(lines)
}

fn floor_minor(basis_minor: i64, rate: Decimal) -> Option<i64> {
    (Decimal::from(basis_minor) * rate).floor().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn table() -> CommissionTable {
        let mut rates = HashMap::new();
        rates.insert("starter".to_string(), rate("0.05"));
        rates.insert("pro".to_string(), rate("0.08"));
        CommissionTable::new(rates, rate("0.10"))
    }

    fn fact(gross: i64, chain: Vec<Uuid>, gifted: bool) -> BillingFact {
        BillingFact {
            subscription_ref: "sub_123".to_string(),
            provider_payment_id: "pay_123".to_string(),
            referred_user_id: Uuid::new_v4(),
            gross_amount_minor: gross,
            currency: "USD".to_string(),
            plan: "pro".to_string(),
            billing_reason:
                crate::domain::value_objects::enums::billing_reasons::BillingReason::First,
            beneficiary_chain: chain,
            is_gifted: gifted,
        }
    }

    #[test]
    fn two_tier_split_for_hundred_dollar_pro_sale() {
        let referrer = Uuid::new_v4();
        let sub_affiliate = Uuid::new_v4();
        let lines =
            compute_commission_lines(&table(), &fact(10_000, vec![referrer, sub_affiliate], false))
                .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].beneficiary_user_id, referrer);
        assert_eq!(lines[0].tier_level, 1);
        assert_eq!(lines[0].commission_amount_minor, 800);
        assert_eq!(lines[1].beneficiary_user_id, sub_affiliate);
        assert_eq!(lines[1].tier_level, 2);
        assert_eq!(lines[1].commission_amount_minor, 80);
    }

    #[test]
    fn tier_two_is_share_of_commission_not_gross() {
        // 9999 * 0.08 = 799.92 -> 799; 799 * 0.10 = 79.9 -> 79.
        let lines = compute_commission_lines(
            &table(),
            &fact(9_999, vec![Uuid::new_v4(), Uuid::new_v4()], false),
        )
        .unwrap();

        assert_eq!(lines[0].commission_amount_minor, 799);
        assert_eq!(lines[1].commission_amount_minor, 79);
    }

    #[test]
    fn single_tier_when_referrer_has_no_referrer() {
        let lines =
            compute_commission_lines(&table(), &fact(10_000, vec![Uuid::new_v4()], false)).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn chain_depth_is_capped() {
        let chain = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let lines = compute_commission_lines(&table(), &fact(10_000, chain, false)).unwrap();
        assert_eq!(lines.len(), MAX_TIER_DEPTH);
    }

    #[test]
    fn gifted_subscription_never_produces_lines() {
        let lines = compute_commission_lines(
            &table(),
            &fact(10_000, vec![Uuid::new_v4(), Uuid::new_v4()], true),
        )
        .unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn missing_plan_rate_is_an_error_not_zero() {
        let mut bad = fact(10_000, vec![Uuid::new_v4()], false);
        bad.plan = "enterprise".to_string();
        let err = compute_commission_lines(&table(), &bad).unwrap_err();
        assert_eq!(err, CommissionError::MissingPlanRate("enterprise".to_string()));
    }

    #[test]
    fn empty_chain_yields_no_lines() {
        let lines = compute_commission_lines(&table(), &fact(10_000, Vec::new(), false)).unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn thirty_day_hold_matures_at_day_thirty_not_before() {
        let paid_at = Utc::now();
        let eligible_at = HoldPolicy::Timed(30).eligible_at(paid_at);

        let day_29 = paid_at + Duration::days(29);
        let day_30 = paid_at + Duration::days(30);
        assert!(day_29 < eligible_at, "line must still be held at T+29d");
        assert!(day_30 >= eligible_at, "line must be payable at T+30d");
    }

    #[test]
    fn hold_policy_eligibility() {
        let paid_at = Utc::now();
        assert_eq!(
            HoldPolicy::Timed(30).eligible_at(paid_at),
            paid_at + Duration::days(30)
        );
        assert_eq!(HoldPolicy::Waived.eligible_at(paid_at), paid_at);
        assert_eq!(HoldPolicy::Waived.days(), 0);
        assert_eq!(HoldPolicy::from_columns("waived", 0), HoldPolicy::Waived);
        assert_eq!(HoldPolicy::from_columns("timed", 30), HoldPolicy::Timed(30));
    }
}
