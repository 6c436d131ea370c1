use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EarningSource {
    Purchase,
    Renewal,
    ReferralBonus,
}

impl EarningSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningSource::Purchase => "purchase",
            EarningSource::Renewal => "renewal",
            EarningSource::ReferralBonus => "referral_bonus",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "purchase" => Some(EarningSource::Purchase),
            "renewal" => Some(EarningSource::Renewal),
            "referral_bonus" => Some(EarningSource::ReferralBonus),
            _ => None,
        }
    }
}

impl Display for EarningSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
