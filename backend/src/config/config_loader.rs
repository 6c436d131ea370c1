use std::collections::HashMap;

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crates::domain::value_objects::{
    commission::{CommissionTable, DEFAULT_HOLD_PERIOD_DAYS, HoldPolicy},
    payouts::{FeeRule, FeeSchedule, MinimumPayoutTable},
};

use super::config_model::{
    AuthSecret, BackendServer, BillingProvider, Commission, Database, DotEnvyConfig, Payout,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: std::env::var("SERVER_PORT_BACKEND")
            .expect("SERVER_PORT_BACKEND is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let billing_provider = BillingProvider {
        billing_webhook_secret: std::env::var("BILLING_WEBHOOK_SECRET")
            .expect("BILLING_WEBHOOK_SECRET is invalid"),
        payout_webhook_secret: std::env::var("PAYOUT_WEBHOOK_SECRET")
            .expect("PAYOUT_WEBHOOK_SECRET is invalid"),
        payout_api_key: std::env::var("PAYOUT_API_KEY").expect("PAYOUT_API_KEY is invalid"),
        payout_api_base: std::env::var("PAYOUT_API_BASE")
            .unwrap_or_else(|_| "https://api.payout-provider.example".to_string()),
    };

    let commission = Commission {
        plan_rates: parse_plan_rates(
            &std::env::var("COMMISSION_PLAN_RATES").expect("COMMISSION_PLAN_RATES is invalid"),
        )?,
        sub_affiliate_rate: std::env::var("SUB_AFFILIATE_RATE")
            .unwrap_or_else(|_| "0.10".to_string())
            .parse()
            .context("SUB_AFFILIATE_RATE must be a decimal rate")?,
        hold_policy: std::env::var("HOLD_POLICY").unwrap_or_else(|_| "timed".to_string()),
        hold_period_days: std::env::var("HOLD_PERIOD_DAYS")
            .unwrap_or_else(|_| DEFAULT_HOLD_PERIOD_DAYS.to_string())
            .parse()?,
    };

    let payout = Payout {
        minimums: parse_minimums(
            &std::env::var("PAYOUT_MINIMUMS").unwrap_or_else(|_| "USD:2500".to_string()),
        )?,
        fee_rules: parse_fee_rules(
            &std::env::var("PAYOUT_FEE_RULES")
                .unwrap_or_else(|_| "bank_transfer:30+0.0025".to_string()),
        )?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        billing_provider,
        commission,
        payout,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        secret: std::env::var("JWT_AUTH_SECRET").expect("JWT_AUTH_SECRET is invalid"),
    })
}

impl Commission {
    pub fn table(&self) -> CommissionTable {
        CommissionTable::new(self.plan_rates.clone(), self.sub_affiliate_rate)
    }

    pub fn hold(&self) -> HoldPolicy {
        match self.hold_policy.as_str() {
            "waived" => HoldPolicy::Waived,
            _ => HoldPolicy::Timed(self.hold_period_days),
        }
    }
}

impl Payout {
    pub fn minimum_table(&self) -> MinimumPayoutTable {
        MinimumPayoutTable::new(self.minimums.clone())
    }

    pub fn fee_schedule(&self) -> FeeSchedule {
        FeeSchedule::new(self.fee_rules.clone())
    }
}

/// `starter:0.05,pro:0.08`
pub fn parse_plan_rates(raw: &str) -> Result<HashMap<String, Decimal>> {
    let mut rates = HashMap::new();
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (plan, rate) = pair
            .split_once(':')
            .with_context(|| format!("malformed plan rate entry '{pair}'"))?;
        let rate: Decimal = rate
            .trim()
            .parse()
            .with_context(|| format!("malformed rate for plan '{plan}'"))?;
        rates.insert(plan.trim().to_string(), rate);
    }
    Ok(rates)
}

/// `USD:2500,THB:90000`
pub fn parse_minimums(raw: &str) -> Result<HashMap<String, i64>> {
    let mut minimums = HashMap::new();
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (currency, amount) = pair
            .split_once(':')
            .with_context(|| format!("malformed minimum entry '{pair}'"))?;
        let amount: i64 = amount
            .trim()
            .parse()
            .with_context(|| format!("malformed minimum amount for '{currency}'"))?;
        minimums.insert(currency.trim().to_uppercase(), amount);
    }
    Ok(minimums)
}

/// `bank_transfer:30+0.0025,paypal:0+0.02` (flat minor units + percentage)
pub fn parse_fee_rules(raw: &str) -> Result<HashMap<String, FeeRule>> {
    let mut rules = HashMap::new();
    for pair in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let (method, rule) = pair
            .split_once(':')
            .with_context(|| format!("malformed fee rule entry '{pair}'"))?;
        let (flat, percent) = rule
            .split_once('+')
            .with_context(|| format!("malformed fee rule for '{method}'"))?;
        rules.insert(
            method.trim().to_string(),
            FeeRule {
                flat_minor: flat
                    .trim()
                    .parse()
                    .with_context(|| format!("malformed flat fee for '{method}'"))?,
                percent: percent
                    .trim()
                    .parse()
                    .with_context(|| format!("malformed percentage fee for '{method}'"))?,
            },
        );
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_rates() {
        let rates = parse_plan_rates("starter:0.05, pro:0.08").unwrap();
        assert_eq!(rates.len(), 2);
        assert_eq!(rates["pro"], "0.08".parse::<Decimal>().unwrap());
    }

    #[test]
    fn rejects_malformed_plan_rates() {
        assert!(parse_plan_rates("pro=0.08").is_err());
        assert!(parse_plan_rates("pro:eight").is_err());
    }

    #[test]
    fn parses_minimums_uppercasing_currency() {
        let minimums = parse_minimums("usd:2500,THB:90000").unwrap();
        assert_eq!(minimums["USD"], 2500);
        assert_eq!(minimums["THB"], 90000);
    }

    #[test]
    fn parses_fee_rules() {
        let rules = parse_fee_rules("bank_transfer:30+0.0025,paypal:0+0.02").unwrap();
        assert_eq!(rules["bank_transfer"].flat_minor, 30);
        assert_eq!(
            rules["paypal"].percent,
            "0.02".parse::<Decimal>().unwrap()
        );
    }

    #[test]
    fn hold_policy_is_explicit() {
        let commission = Commission {
            plan_rates: HashMap::new(),
            sub_affiliate_rate: "0.10".parse().unwrap(),
            hold_policy: "waived".to_string(),
            hold_period_days: 30,
        };
        assert_eq!(commission.hold(), HoldPolicy::Waived);

        let timed = Commission {
            hold_policy: "timed".to_string(),
            ..commission
        };
        assert_eq!(timed.hold(), HoldPolicy::Timed(30));
    }
}
