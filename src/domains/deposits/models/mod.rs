pub mod transfer;
pub mod status;

pub use transfer::*;
pub use status::*;
