// Deposits domain state
// 입금 도메인 상태
use crate::domains::deposits::services::WatcherStatus;

/// Deposits domain state
#[derive(Clone)]
pub struct DepositState {
    /// 입금 감시자 상태 (감시자 태스크와 공유)
    pub watcher_status: WatcherStatus,
}

impl DepositState {
    pub fn new(watcher_status: WatcherStatus) -> Self {
        Self { watcher_status }
    }
}
