pub mod balance_handler;

pub use balance_handler::*;
