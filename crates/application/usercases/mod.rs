pub mod billing_webhook;
pub mod earnings;
pub mod hold_sweep;
pub mod payouts;
pub mod reversals;
