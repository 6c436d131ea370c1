use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EarningStatus {
    Pending,
    Approved,
    Paid,
    Disputed,
    Cancelled,
}

impl EarningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarningStatus::Pending => "pending",
            EarningStatus::Approved => "approved",
            EarningStatus::Paid => "paid",
            EarningStatus::Disputed => "disputed",
            EarningStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(EarningStatus::Pending),
            "approved" => Some(EarningStatus::Approved),
            "paid" => Some(EarningStatus::Paid),
            "disputed" => Some(EarningStatus::Disputed),
            "cancelled" => Some(EarningStatus::Cancelled),
            _ => None,
        }
    }

    /// `paid`, `disputed` and `cancelled` accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EarningStatus::Paid | EarningStatus::Disputed | EarningStatus::Cancelled
        )
    }
}

impl Display for EarningStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_status() {
        for status in [
            EarningStatus::Pending,
            EarningStatus::Approved,
            EarningStatus::Paid,
            EarningStatus::Disputed,
            EarningStatus::Cancelled,
        ] {
            assert_eq!(EarningStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(EarningStatus::from_str("refunded"), None);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!EarningStatus::Pending.is_terminal());
        assert!(!EarningStatus::Approved.is_terminal());
        assert!(EarningStatus::Paid.is_terminal());
        assert!(EarningStatus::Disputed.is_terminal());
        assert!(EarningStatus::Cancelled.is_terminal());
    }
}
