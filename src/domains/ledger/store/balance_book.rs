// =====================================================
// BalanceBook - 메모리 기반 잔고 관리
// =====================================================
// 역할: 사용자 잔고를 메모리에 보관
// 
// 핵심 설계:
// 1. DashMap (shard 단위 락)으로 같은 사용자 쓰기만 직렬화
// 2. 다른 사용자 조회는 서로 막지 않음
// 3. 영속성 없음 → 단독으로는 테스트용, WalLedgerStore가 WAL과 함께 사용
// =====================================================

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use crate::domains::ledger::models::{normalize_user, BalanceRecord};
use crate::shared::errors::LedgerError;
use super::{credit_key, set_key, LedgerStore};

/// 메모리 잔고 장부
///
/// 구조:
/// DashMap {
///   "alice" -> 8.0
///   "bob"   -> 10.0
/// }
#[derive(Debug, Default)]
pub struct BalanceBook {
    balances: DashMap<String, Decimal>,
}

impl BalanceBook {
    /// 새 BalanceBook 생성
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// 잔고 증가 후 새 잔고 반환
    ///
    /// entry()가 해당 shard의 쓰기 락을 잡고 있는 동안 읽기-수정-쓰기가 끝나므로
    /// 같은 사용자에 대한 동시 증가가 유실되지 않음.
    /// 합계가 Decimal 범위를 넘으면 잔고는 그대로 두고 InvalidAmount
    pub fn credit(&self, key: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        let mut balance = self
            .balances
            .entry(key.to_string())
            .or_insert(Decimal::ZERO);
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount(amount))?;
        *balance = updated;
        Ok(updated)
    }

    /// 증가 후 잔고를 미리 계산 (반영하지 않음, 범위 초과면 None)
    pub fn checked_credit(&self, key: &str, amount: Decimal) -> Option<Decimal> {
        self.balance(key).checked_add(amount)
    }

    /// 잔고 덮어쓰기
    pub fn overwrite(&self, key: &str, amount: Decimal) {
        self.balances.insert(key.to_string(), amount);
    }

    /// 잔고 조회 (없으면 0)
    pub fn balance(&self, key: &str) -> Decimal {
        self.balances
            .get(key)
            .map(|balance| *balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// 레코드 수
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// 전체 잔고 목록 (사용자 이름 순)
    pub fn records(&self) -> Vec<BalanceRecord> {
        let mut records: Vec<BalanceRecord> = self
            .balances
            .iter()
            .map(|entry| BalanceRecord {
                user: entry.key().clone(),
                balance: *entry.value(),
            })
            .collect();
        records.sort_by(|a, b| a.user.cmp(&b.user));
        records
    }
}

#[async_trait]
impl LedgerStore for BalanceBook {
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        let key = credit_key(user, amount)?;
        self.credit(&key, amount)
    }

    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError> {
        let key = set_key(user, amount)?;
        self.overwrite(&key, amount);
        Ok(())
    }

    async fn get(&self, user: &str) -> Result<Decimal, LedgerError> {
        Ok(self.balance(&normalize_user(user)))
    }
}
