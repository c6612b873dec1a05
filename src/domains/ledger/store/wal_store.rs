// =====================================================
// WalLedgerStore - WAL 기반 영구 원장
// =====================================================
// 역할: DB 없이도 영속성을 보장하는 원장 저장소
// 
// 쓰기: WAL writer 락 → append + fsync → BalanceBook 반영 → 락 해제
//       (WAL 순서 == 반영 순서, 디스크 동기화 전에는 반환하지 않음)
// 읽기: BalanceBook만 조회 → writer 락을 기다리지 않음
// 시작: WAL 재생으로 BalanceBook 복원
// =====================================================

use std::path::Path;
use std::sync::Arc;
use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{normalize_user, BalanceRecord};
use crate::shared::errors::LedgerError;
use super::wal::{WalEntry, WalReader, WalWriter};
use super::{credit_key, set_key, BalanceBook, LedgerStore};

/// WAL 파일 이름
pub const WAL_FILE_NAME: &str = "ledger.wal";

struct Inner {
    book: BalanceBook,
    writer: Mutex<WalWriter>,
}

/// WAL 기반 원장 저장소
#[derive(Clone)]
pub struct WalLedgerStore {
    inner: Arc<Inner>,
}

impl WalLedgerStore {
    /// 데이터 디렉토리의 WAL을 재생하여 원장 열기
    /// Open the ledger in `data_dir`, replaying its WAL
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(WAL_FILE_NAME);

        let replay = WalReader::new(path.clone())
            .replay()
            .context(format!("Failed to replay WAL at {}", path.display()))?;

        if replay.torn_tail {
            tracing::warn!(
                path = %path.display(),
                valid_len = replay.valid_len,
                "Discarding unsynced trailing WAL entry"
            );
        }

        let book = BalanceBook::new();
        for entry in &replay.entries {
            match entry {
                WalEntry::Credited { user, amount, .. } => {
                    book.credit(user, *amount)
                        .with_context(|| format!("Failed to replay WAL credit for {}", user))?;
                }
                WalEntry::BalanceSet { user, balance, .. } => {
                    book.overwrite(user, *balance);
                }
            }
        }

        let writer = WalWriter::open(&path, Some(replay.valid_len))?;

        tracing::info!(
            path = %writer.file_path().display(),
            entries = replay.entries.len(),
            users = book.len(),
            "WAL ledger opened"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                book,
                writer: Mutex::new(writer),
            }),
        })
    }

    /// 전체 잔고 목록
    pub fn records(&self) -> Vec<BalanceRecord> {
        self.inner.book.records()
    }

    /// WAL 기록 + 메모리 반영 (blocking 스레드에서 실행)
    async fn write(&self, entry: WalEntry) -> Result<Decimal, LedgerError> {
        let inner = self.inner.clone();

        tokio::task::spawn_blocking(move || -> Result<Decimal, LedgerError> {
            let mut writer = inner.writer.lock();

            // 범위를 넘는 증가는 WAL에 쓰기 전에 거부 (기록된 엔트리는 재생 시 항상 적용 가능해야 함)
            // writer 락을 잡고 있으므로 검사와 반영 사이에 다른 쓰기가 끼어들지 않음
            if let WalEntry::Credited { user, amount, .. } = &entry {
                if inner.book.checked_credit(user, *amount).is_none() {
                    return Err(LedgerError::InvalidAmount(*amount));
                }
            }

            writer.append(&entry).map_err(LedgerError::store)?;

            // 디스크에 기록된 뒤에만 메모리에 반영
            let balance = match &entry {
                WalEntry::Credited { user, amount, .. } => inner.book.credit(user, *amount)?,
                WalEntry::BalanceSet { user, balance, .. } => {
                    inner.book.overwrite(user, *balance);
                    *balance
                }
            };
            Ok(balance)
        })
        .await
        .map_err(|e| LedgerError::StoreUnavailable(format!("WAL writer task failed: {}", e)))?
    }
}

#[async_trait]
impl LedgerStore for WalLedgerStore {
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        let key = credit_key(user, amount)?;
        self.write(WalEntry::credited(&key, amount)).await
    }

    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError> {
        let key = set_key(user, amount)?;
        self.write(WalEntry::balance_set(&key, amount)).await?;
        Ok(())
    }

    async fn get(&self, user: &str) -> Result<Decimal, LedgerError> {
        Ok(self.inner.book.balance(&normalize_user(user)))
    }
}
