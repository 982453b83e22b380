//! Goal ledger subsystem.

pub mod ledger;
