pub mod earnings;
pub mod ledger_outbox;
pub mod payouts;
pub mod processed_payments;
pub mod webhook_events;
