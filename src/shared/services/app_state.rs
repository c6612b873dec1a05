use std::sync::Arc;
use crate::domains::deposits::services::{DepositState, WatcherStatus};
use crate::domains::ledger::services::LedgerState;
use crate::domains::ledger::store::LedgerStore;
use crate::shared::config::AppConfig;

/// Application state (combines all domain states)
/// 애플리케이션 상태 (모든 도메인 상태를 조합)
///
/// 전역 변수 없이 main에서 만든 원장 저장소와 감시자 상태를 주입받아 조합
#[derive(Clone)]
pub struct AppState {
    pub ledger_state: LedgerState,
    pub deposit_state: DepositState,
}

impl AppState {
    /// Create AppState
    ///
    /// # Arguments
    /// * `config` - 애플리케이션 설정 (토큰 심볼)
    /// * `ledger` - 원장 저장소 (입금 감시자와 공유)
    /// * `watcher_status` - 실행 중인 입금 감시자의 상태 핸들
    pub fn new(
        config: &AppConfig,
        ledger: Arc<dyn LedgerStore>,
        watcher_status: WatcherStatus,
    ) -> Self {
        Self {
            ledger_state: LedgerState::new(ledger, &config.token_symbol),
            deposit_state: DepositState::new(watcher_status),
        }
    }
}
