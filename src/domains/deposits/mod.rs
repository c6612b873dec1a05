// Deposits domain module
pub mod models;
pub mod source;
pub mod services;
pub mod handlers;
pub mod routes;

pub use models::*;
