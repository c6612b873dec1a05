use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use crate::domains::deposits::models::{CycleReport, WatcherState, WatcherStatusResponse};

#[derive(Default)]
struct Stats {
    state: AtomicU8,
    cycles: AtomicU64,
    credited_total: AtomicU64,
    fetch_failures: AtomicU64,
    store_failures: AtomicU64,
    seen_transfers: AtomicU64,
    last: Mutex<LastCycle>,
}

#[derive(Default)]
struct LastCycle {
    at: Option<DateTime<Utc>>,
    report: Option<CycleReport>,
    error: Option<String>,
}

/// 입금 감시자 상태 (감시자가 쓰고 API가 읽음)
/// Deposit watcher status, written by the watcher and read by the status API
#[derive(Clone, Default)]
pub struct WatcherStatus {
    stats: Arc<Stats>,
}

const IDLE: u8 = 0;
const PROCESSING: u8 = 1;
const STOPPED: u8 = 2;

impl WatcherStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatcherState {
        match self.stats.state.load(Ordering::Acquire) {
            PROCESSING => WatcherState::Processing,
            STOPPED => WatcherState::Stopped,
            _ => WatcherState::Idle,
        }
    }

    pub(crate) fn set_state(&self, state: WatcherState) {
        let value = match state {
            WatcherState::Idle => IDLE,
            WatcherState::Processing => PROCESSING,
            WatcherState::Stopped => STOPPED,
        };
        self.stats.state.store(value, Ordering::Release);
    }

    pub(crate) fn record_cycle(&self, report: &CycleReport, seen_transfers: usize) {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);
        self.stats.credited_total.fetch_add(report.credited as u64, Ordering::Relaxed);
        self.stats.store_failures.fetch_add(report.failed as u64, Ordering::Relaxed);
        self.stats.seen_transfers.store(seen_transfers as u64, Ordering::Relaxed);

        let mut last = self.stats.last.lock();
        last.at = Some(Utc::now());
        last.report = Some(report.clone());
        if report.failed == 0 {
            last.error = None;
        }
    }

    pub(crate) fn record_fetch_failure(&self, error: &str) {
        self.stats.cycles.fetch_add(1, Ordering::Relaxed);
        self.stats.fetch_failures.fetch_add(1, Ordering::Relaxed);

        let mut last = self.stats.last.lock();
        last.at = Some(Utc::now());
        last.report = None;
        last.error = Some(error.to_string());
    }

    pub(crate) fn record_store_failure(&self, error: &str) {
        self.stats.last.lock().error = Some(error.to_string());
    }

    /// 현재 상태 스냅샷
    pub fn snapshot(&self) -> WatcherStatusResponse {
        let last = self.stats.last.lock();
        WatcherStatusResponse {
            state: self.state(),
            cycles: self.stats.cycles.load(Ordering::Relaxed),
            credited_total: self.stats.credited_total.load(Ordering::Relaxed),
            fetch_failures: self.stats.fetch_failures.load(Ordering::Relaxed),
            store_failures: self.stats.store_failures.load(Ordering::Relaxed),
            seen_transfers: self.stats.seen_transfers.load(Ordering::Relaxed),
            last_cycle_at: last.at,
            last_report: last.report.clone(),
            last_error: last.error.clone(),
        }
    }
}
