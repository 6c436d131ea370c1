pub mod billing_dedup;
pub mod earnings;
pub mod outbox;
pub mod payouts;
