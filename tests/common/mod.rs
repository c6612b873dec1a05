// =====================================================
// 통합 테스트 공통 헬퍼
// =====================================================
// 목적: 외부 API/DB 없이 입금 감시자를 돌리기 위한 fake 구현
//
// - ScriptedSource: 미리 정한 응답을 순서대로 돌려주는 입금 소스
// - FlakyLedger: 특정 사용자에 대해 저장 실패를 흉내내는 원장
// - SlowLedger: 증가마다 지연이 있는 원장 (종료 테스트용)
// =====================================================
#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use deposit_ledger::domains::deposits::models::TransferRecord;
use deposit_ledger::domains::deposits::services::DepositWatcher;
use deposit_ledger::domains::deposits::source::DepositSource;
use deposit_ledger::domains::ledger::store::{BalanceBook, LedgerStore};
use deposit_ledger::shared::errors::LedgerError;

pub const TEST_SYMBOL: &str = "PEK";

/// 짧은 표기: transfer("a", "Alice", "5")
pub fn transfer(id: &str, from: &str, quantity: &str) -> TransferRecord {
    TransferRecord::new(id, from, quantity)
}

pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// 응답 스크립트: Ok(배치) 또는 Err(에러 메시지)
pub type Script = Result<Vec<TransferRecord>, String>;

/// 미리 정한 응답을 순서대로 돌려주는 입금 소스
/// 스크립트가 끝나면 마지막 성공 배치를 계속 반환 (실제 피드처럼 같은 window 재조회)
pub struct ScriptedSource {
    script: Mutex<VecDeque<Script>>,
    last_batch: Mutex<Vec<TransferRecord>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last_batch: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn batches(batches: Vec<Vec<TransferRecord>>) -> Arc<Self> {
        Self::new(batches.into_iter().map(Ok).collect())
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DepositSource for ScriptedSource {
    async fn fetch_recent_transfers(&self) -> Result<Vec<TransferRecord>, LedgerError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(batch)) => {
                *self.last_batch.lock() = batch.clone();
                Ok(batch)
            }
            Some(Err(message)) => Err(LedgerError::SourceUnavailable(message)),
            None => Ok(self.last_batch.lock().clone()),
        }
    }
}

/// 특정 사용자에 대한 증가를 실패시키는 원장
pub struct FlakyLedger {
    pub book: BalanceBook,
    failing_users: Mutex<HashSet<String>>,
    pub increments: AtomicUsize,
}

impl FlakyLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            book: BalanceBook::new(),
            failing_users: Mutex::new(HashSet::new()),
            increments: AtomicUsize::new(0),
        })
    }

    pub fn fail_for(&self, user: &str) {
        self.failing_users.lock().insert(user.to_string());
    }

    pub fn recover(&self) {
        self.failing_users.lock().clear();
    }
}

#[async_trait]
impl LedgerStore for FlakyLedger {
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        if self.failing_users.lock().contains(user) {
            return Err(LedgerError::StoreUnavailable("disk full".to_string()));
        }
        self.increments.fetch_add(1, Ordering::SeqCst);
        self.book.increment(user, amount).await
    }

    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError> {
        self.book.set(user, amount).await
    }

    async fn get(&self, user: &str) -> Result<Decimal, LedgerError> {
        if self.failing_users.lock().contains(user) {
            return Err(LedgerError::StoreUnavailable("disk full".to_string()));
        }
        self.book.get(user).await
    }
}

/// 증가마다 지연이 있는 원장
pub struct SlowLedger {
    pub book: BalanceBook,
    pub delay: Duration,
    pub started: AtomicUsize,
}

impl SlowLedger {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            book: BalanceBook::new(),
            delay,
            started: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LedgerStore for SlowLedger {
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.book.increment(user, amount).await
    }

    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError> {
        self.book.set(user, amount).await
    }

    async fn get(&self, user: &str) -> Result<Decimal, LedgerError> {
        self.book.get(user).await
    }
}

/// 테스트용 감시자 (폴링 주기 10ms)
pub fn watcher(source: Arc<dyn DepositSource>, ledger: Arc<dyn LedgerStore>) -> DepositWatcher {
    DepositWatcher::new(source, ledger, TEST_SYMBOL, Duration::from_millis(10))
}

/// 조건이 참이 될 때까지 대기 (최대 5초)
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
