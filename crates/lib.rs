pub mod application;
pub mod billing;
pub mod domain;
pub mod infra;
pub mod observability;
