pub mod billing_reasons;
pub mod earning_sources;
pub mod earning_statuses;
pub mod outbox_statuses;
pub mod payout_statuses;
