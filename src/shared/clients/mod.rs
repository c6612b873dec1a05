// External API clients
pub mod hive_engine;

pub use hive_engine::*;
