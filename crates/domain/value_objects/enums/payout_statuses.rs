use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    InTransit,
    Paid,
    Failed,
    Cancelled,
    Returned,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::InTransit => "in_transit",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Failed => "failed",
            PayoutStatus::Cancelled => "cancelled",
            PayoutStatus::Returned => "returned",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PayoutStatus::Pending),
            "processing" => Some(PayoutStatus::Processing),
            "in_transit" => Some(PayoutStatus::InTransit),
            "paid" => Some(PayoutStatus::Paid),
            "failed" => Some(PayoutStatus::Failed),
            "cancelled" => Some(PayoutStatus::Cancelled),
            "returned" => Some(PayoutStatus::Returned),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PayoutStatus::Paid
                | PayoutStatus::Failed
                | PayoutStatus::Cancelled
                | PayoutStatus::Returned
        )
    }

    /// Terminal outcomes that hand the linked earnings back to the eligible pool.
    pub fn releases_earnings(&self) -> bool {
        matches!(
            self,
            PayoutStatus::Failed | PayoutStatus::Cancelled | PayoutStatus::Returned
        )
    }
}

impl Display for PayoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_non_paid_terminals_release() {
        assert!(!PayoutStatus::Paid.releases_earnings());
        assert!(!PayoutStatus::Processing.releases_earnings());
        assert!(PayoutStatus::Failed.releases_earnings());
        assert!(PayoutStatus::Cancelled.releases_earnings());
        assert!(PayoutStatus::Returned.releases_earnings());
    }
}
