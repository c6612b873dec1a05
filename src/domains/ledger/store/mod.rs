// =====================================================
// 원장 저장소 모듈
// Ledger Store Module
// =====================================================
// 사용자 → 잔고 매핑을 영구 저장하는 저장소 인터페이스
// 
// 구현체:
// - BalanceRepository (shared::database): PostgreSQL, 운영용
// - WalLedgerStore: 메모리 잔고 + fsync WAL 파일, DB 없이 실행할 때
// - BalanceBook: 메모리 전용 (영속성 없음), 테스트 및 WalLedgerStore 내부용
//
// 동시성:
// - 같은 사용자에 대한 증가는 직렬화 (lost update 없음)
// - 다른 사용자에 대한 조회는 쓰기 락을 기다리지 않음
// =====================================================

pub mod balance_book;
pub mod wal;
pub mod wal_store;

use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::domains::ledger::models::normalize_user;
use crate::shared::errors::LedgerError;

pub use balance_book::BalanceBook;
pub use wal_store::WalLedgerStore;

/// 원장 저장소 인터페이스
/// Ledger store interface
///
/// 입금 감시자(유일한 writer)와 잔고 조회 서비스(reader)가 공유합니다.
/// 모든 메서드는 사용자 이름을 내부에서 다시 정규화합니다.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// 잔고 증가 (레코드가 없으면 0으로 생성 후 증가)
    /// Atomically add `amount` (> 0) to the user's balance, creating it at zero
    ///
    /// # Returns
    /// * `Ok(Decimal)` - 증가 후 잔고
    /// * `Err(InvalidAmount)` - amount <= 0
    /// * `Err(StoreUnavailable)` - 저장 실패 (증가가 반영되지 않음)
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError>;

    /// 잔고 덮어쓰기 (수동 보정용, 입금 경로에서는 사용하지 않음)
    /// Unconditional overwrite for out-of-band corrections
    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError>;

    /// 현재 잔고 조회 (없는 사용자는 0)
    /// Current balance; an unknown user has a zero balance
    async fn get(&self, user: &str) -> Result<Decimal, LedgerError>;
}

/// 증가 요청 검증 후 정규화된 key 반환
pub(crate) fn credit_key(user: &str, amount: Decimal) -> Result<String, LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    non_empty_key(user)
}

/// 설정 요청 검증 후 정규화된 key 반환
pub(crate) fn set_key(user: &str, amount: Decimal) -> Result<String, LedgerError> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::InvalidAmount(amount));
    }
    non_empty_key(user)
}

fn non_empty_key(user: &str) -> Result<String, LedgerError> {
    let key = normalize_user(user);
    if key.is_empty() {
        return Err(LedgerError::MissingParameter("user"));
    }
    Ok(key)
}
