use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use crate::domains::deposits::models::{CycleReport, WatcherState};
use crate::domains::deposits::source::DepositSource;
use crate::domains::ledger::store::LedgerStore;
use crate::shared::errors::LedgerError;
use super::{SeenTransfers, WatcherStatus};

/// 입금 감시자
/// Deposit Watcher
///
/// 역할:
/// - 주기적으로 최근 전송 목록 조회
/// - 이미 반영된 트랜잭션은 건너뜀 (SeenTransfers)
/// - 새 입금을 원장에 반영 (원장의 유일한 writer)
///
/// 처리 흐름 (한 주기):
/// 1. fetch_recent_transfers() → 실패하면 주기 전체를 건너뛰고 다음 주기에 재시도
/// 2. 레코드별 검증 (빈 사용자, 수량 <= 0 → 건너뜀)
/// 3. 중복 확인
/// 4. ledger.increment() 성공 후에만 mark_seen()
///
/// 레코드 하나의 실패가 같은 배치의 나머지 처리를 막지 않습니다.
pub struct DepositWatcher {
    source: Arc<dyn DepositSource>,
    ledger: Arc<dyn LedgerStore>,
    seen: SeenTransfers,
    symbol: String,
    poll_interval: Duration,
    status: WatcherStatus,
}

impl DepositWatcher {
    /// 생성자
    ///
    /// # Arguments
    /// * `source` - 입금 내역 소스
    /// * `ledger` - 원장 저장소 (잔고 조회 서비스와 공유)
    /// * `symbol` - 토큰 심볼 (로그용)
    /// * `poll_interval` - 폴링 주기 (jitter/backoff 없음)
    pub fn new(
        source: Arc<dyn DepositSource>,
        ledger: Arc<dyn LedgerStore>,
        symbol: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            ledger,
            seen: SeenTransfers::new(),
            symbol: symbol.into(),
            poll_interval,
            status: WatcherStatus::new(),
        }
    }

    /// 상태 핸들 (API에서 조회)
    pub fn status(&self) -> WatcherStatus {
        self.status.clone()
    }

    /// 현재 프로세스에서 반영된 트랜잭션 수
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// 한 번의 폴링 주기 실행
    /// Run one poll cycle
    ///
    /// # Returns
    /// * `Ok(CycleReport)` - 배치 처리 완료 (일부 레코드 실패 포함)
    /// * `Err(SourceUnavailable)` - 조회 실패, 아무 상태도 바뀌지 않음
    pub async fn run_cycle(&mut self) -> Result<CycleReport, LedgerError> {
        let transfers = self.source.fetch_recent_transfers().await?;

        let mut report = CycleReport {
            fetched: transfers.len(),
            ..CycleReport::default()
        };

        for transfer in &transfers {
            let deposit = match transfer.to_deposit() {
                Ok(deposit) => deposit,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping invalid transfer");
                    report.invalid += 1;
                    continue;
                }
            };

            if !self.seen.is_new(&deposit.tx_id) {
                report.duplicates += 1;
                continue;
            }

            match self.ledger.increment(&deposit.user, deposit.quantity).await {
                Ok(balance) => {
                    // 증가가 확정된 뒤에만 반영 완료로 표시
                    self.seen.mark_seen(&deposit.tx_id);
                    report.credited += 1;
                    tracing::info!(
                        tx_id = %deposit.tx_id,
                        user = %deposit.user,
                        quantity = %deposit.quantity,
                        symbol = %self.symbol,
                        balance = %balance,
                        "Deposit credited"
                    );
                }
                Err(LedgerError::InvalidAmount(amount)) => {
                    tracing::warn!(tx_id = %deposit.tx_id, amount = %amount, "Ledger rejected deposit amount");
                    report.invalid += 1;
                }
                Err(e) => {
                    // 반영 실패: seen 표시 안 함 → window 안에 남아 있으면 다음 주기에 재시도
                    // window 밖으로 밀려나면 입금이 유실되므로 ERROR로 남김
                    tracing::error!(
                        tx_id = %deposit.tx_id,
                        user = %deposit.user,
                        quantity = %deposit.quantity,
                        error = %e,
                        "Failed to credit deposit; will retry while it remains in the poll window (potential fund loss)"
                    );
                    self.status.record_store_failure(&e.to_string());
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// 감시 루프 시작 (백그라운드 태스크)
    /// Spawn the poll loop as a background task
    pub fn start(self) -> WatcherHandle {
        let shutdown = CancellationToken::new();
        let status = self.status();
        let task = tokio::spawn(self.run(shutdown.clone()));

        WatcherHandle { shutdown, status, task }
    }

    /// 감시 루프
    ///
    /// 첫 주기는 즉시 실행. 종료 신호는 주기 사이에서만 확인하므로
    /// 처리 중인 배치는 끝까지 실행된 뒤 종료됩니다.
    pub async fn run(mut self, shutdown: CancellationToken) {
        tracing::info!(
            symbol = %self.symbol,
            poll_interval_secs = self.poll_interval.as_secs_f64(),
            "Starting deposit watcher"
        );

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.status.set_state(WatcherState::Processing);

            match self.run_cycle().await {
                Ok(report) => {
                    if report.credited > 0 || report.failed > 0 {
                        tracing::info!(?report, "Deposit cycle finished");
                    } else {
                        tracing::debug!(?report, "Deposit cycle finished");
                    }
                    self.status.record_cycle(&report, self.seen.len());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Deposit fetch failed; skipping cycle");
                    self.status.record_fetch_failure(&e.to_string());
                }
            }

            self.status.set_state(WatcherState::Idle);
        }

        self.status.set_state(WatcherState::Stopped);
        tracing::info!(seen = self.seen.len(), "Deposit watcher stopped");
    }
}

/// 실행 중인 감시자 핸들
/// Handle to a running deposit watcher
pub struct WatcherHandle {
    shutdown: CancellationToken,
    status: WatcherStatus,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn status(&self) -> &WatcherStatus {
        &self.status
    }

    /// 종료 신호 전송 후 처리 중인 배치가 끝날 때까지 대기
    /// Signal shutdown and wait for the in-flight batch to finish
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Deposit watcher task ended abnormally");
        }
    }
}
