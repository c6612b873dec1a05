// Domain modules
pub mod ledger;
pub mod deposits;
