use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::earning_sources::EarningSource;

/// Why the provider charged the subscriber: the initial purchase or a cycle renewal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillingReason {
    First,
    Renewal,
}

impl BillingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingReason::First => "first",
            BillingReason::Renewal => "renewal",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "first" => Some(BillingReason::First),
            "renewal" => Some(BillingReason::Renewal),
            _ => None,
        }
    }

    pub fn earning_source(&self) -> EarningSource {
        match self {
            BillingReason::First => EarningSource::Purchase,
            BillingReason::Renewal => EarningSource::Renewal,
        }
    }
}

impl Display for BillingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
