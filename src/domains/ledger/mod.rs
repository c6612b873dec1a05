// Ledger domain module
pub mod models;
pub mod store;
pub mod services;
pub mod handlers;
pub mod routes;

pub use models::*;
