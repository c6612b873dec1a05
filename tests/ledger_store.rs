// =====================================================
// 원장 저장소 통합 테스트
// =====================================================

mod common;
use common::*;
use std::sync::Arc;
use rust_decimal::Decimal;
use deposit_ledger::domains::ledger::models::BalanceRecord;
use deposit_ledger::domains::ledger::store::{BalanceBook, LedgerStore, WalLedgerStore};
use deposit_ledger::domains::ledger::store::wal_store::WAL_FILE_NAME;

/// 테스트: 재시작(다시 열기) 후에도 잔고 유지
#[tokio::test]
async fn test_wal_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = WalLedgerStore::open(dir.path()).unwrap();
        assert_eq!(store.increment("Alice", dec("5")).await.unwrap(), dec("5"));
        assert_eq!(store.increment("alice", dec("3")).await.unwrap(), dec("8"));
        store.increment("bob", dec("10")).await.unwrap();
        store.set("bob", dec("7.25")).await.unwrap();
        store.increment("bob", dec("0.75")).await.unwrap();
    }

    let reopened = WalLedgerStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get("ALICE").await.unwrap(), dec("8"));
    assert_eq!(reopened.get("bob").await.unwrap(), dec("8"));
    assert_eq!(reopened.get("nobody").await.unwrap(), Decimal::ZERO);
    assert_eq!(
        reopened.records(),
        vec![
            BalanceRecord { user: "alice".to_string(), balance: dec("8") },
            BalanceRecord { user: "bob".to_string(), balance: dec("8") },
        ]
    );
}

/// 테스트: 거부된 요청은 WAL에 기록되지 않음
#[tokio::test]
async fn test_wal_store_rejects_invalid_amounts() {
    let dir = tempfile::tempdir().unwrap();
    let store = WalLedgerStore::open(dir.path()).unwrap();

    assert!(store.increment("carol", Decimal::ZERO).await.is_err());
    assert!(store.increment("carol", dec("-1")).await.is_err());
    assert!(store.set("carol", dec("-1")).await.is_err());

    let wal = std::fs::read_to_string(dir.path().join(WAL_FILE_NAME)).unwrap();
    assert!(wal.is_empty());
    assert_eq!(store.get("carol").await.unwrap(), Decimal::ZERO);
}

/// 테스트: 반환된 증가는 이미 디스크에 있음 (다른 인스턴스로 바로 재생 가능)
#[tokio::test]
async fn test_wal_store_increment_is_durable_on_return() {
    let dir = tempfile::tempdir().unwrap();
    let store = WalLedgerStore::open(dir.path()).unwrap();

    store.increment("dave", dec("1.1")).await.unwrap();

    // 첫 인스턴스를 닫지 않은 상태에서 파일만 다시 재생
    let replayed = WalLedgerStore::open(dir.path()).unwrap();
    assert_eq!(replayed.get("dave").await.unwrap(), dec("1.1"));
}

/// 테스트: 같은 사용자에 대한 동시 증가가 유실되지 않음 (WAL)
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wal_store_concurrent_increments() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(WalLedgerStore::open(dir.path()).unwrap());

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..20 {
        let store = store.clone();
        tasks.spawn(async move {
            for _ in 0..5 {
                let user = if i % 2 == 0 { "Erin" } else { "erin" };
                store.increment(user, dec("0.01")).await.unwrap();
            }
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_eq!(store.get("erin").await.unwrap(), dec("1.00"));

    let reopened = WalLedgerStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get("erin").await.unwrap(), dec("1.00"));
}

/// 테스트: 쓰기 중 조회는 항상 완전히 반영된 값만 보고, 감소하지 않음
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_observe_partial_or_decreasing_balance() {
    let book = Arc::new(BalanceBook::new());

    let writer = {
        let book = book.clone();
        tokio::spawn(async move {
            for _ in 0..2_000 {
                book.increment("frank", dec("0.5")).await.unwrap();
            }
        })
    };

    let reader = {
        let book = book.clone();
        tokio::spawn(async move {
            let mut last = Decimal::ZERO;
            loop {
                let current = book.get("frank").await.unwrap();
                assert!(current >= last, "balance decreased: {} -> {}", last, current);
                // 0.5 단위로만 증가하므로 중간 값은 있을 수 없음
                assert_eq!(current % dec("0.5"), Decimal::ZERO);
                last = current;
                if current == dec("1000") {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert_eq!(book.get("frank").await.unwrap(), dec("1000"));
}

/// 테스트: Decimal 범위를 넘는 입금은 WAL에 기록되지 않고, 재시작도 정상
#[tokio::test]
async fn test_wal_store_rejects_overflow_before_logging() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(WalLedgerStore::open(dir.path()).unwrap());
    let huge = Decimal::MAX;

    let source = ScriptedSource::batches(vec![vec![
        transfer("a", "mallory", &huge.to_string()),
        transfer("b", "mallory", &huge.to_string()),
    ]]);
    let mut watcher = watcher(source, store.clone());

    let first = watcher.run_cycle().await.unwrap();
    assert_eq!(first.credited, 1);
    assert_eq!(first.invalid, 1);
    assert_eq!(first.failed, 0);

    // 다음 주기에도 WAL은 늘어나지 않음
    let second = watcher.run_cycle().await.unwrap();
    assert_eq!(second.duplicates, 1);
    assert_eq!(second.invalid, 1);
    assert_eq!(second.failed, 0);

    let wal = std::fs::read_to_string(dir.path().join(WAL_FILE_NAME)).unwrap();
    assert_eq!(wal.lines().count(), 1);
    assert_eq!(store.get("mallory").await.unwrap(), huge);

    let reopened = WalLedgerStore::open(dir.path()).unwrap();
    assert_eq!(reopened.get("mallory").await.unwrap(), huge);
    assert!(reopened.increment("mallory", dec("1")).await.is_err());
    assert!(reopened.increment("trent", dec("0.5")).await.is_ok());
}
