pub mod seen_transfers;
pub mod watcher_status;
pub mod deposit_watcher;
pub mod state;

pub use seen_transfers::SeenTransfers;
pub use watcher_status::WatcherStatus;
pub use deposit_watcher::{DepositWatcher, WatcherHandle};
pub use state::DepositState;
