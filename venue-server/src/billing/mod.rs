//! Billing
//!
//! Money handling in two layers: [`ledger`] holds the pure arithmetic over
//! orders and tables, [`service`] wires it to the repositories and the
//! closing-history audit trail.

pub mod ledger;
pub mod service;

pub use ledger::{recalculate_total, validate_items};
pub use service::BillingService;
