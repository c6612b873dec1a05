use std::sync::Arc;
use crate::domains::ledger::models::{normalize_user, BalanceResponse};
use crate::domains::ledger::store::LedgerStore;
use crate::shared::errors::LedgerError;

/// 잔고 조회 서비스
/// Balance Query Service
///
/// 역할:
/// - 사용자 이름을 정규화한 뒤 원장에서 잔고 조회
/// - 읽기 전용 (원장을 수정하지 않음)
///
/// 주의:
/// - 입금 감시자와 별도로 동시에 호출됨 → 동시성은 원장 저장소에 맡김
#[derive(Clone)]
pub struct BalanceService {
    ledger: Arc<dyn LedgerStore>,
    symbol: String,
}

impl BalanceService {
    /// 생성자
    ///
    /// # Arguments
    /// * `ledger` - 원장 저장소 (입금 감시자와 공유)
    /// * `symbol` - 응답에 포함할 토큰 심볼
    pub fn new(ledger: Arc<dyn LedgerStore>, symbol: impl Into<String>) -> Self {
        Self {
            ledger,
            symbol: symbol.into(),
        }
    }

    /// 사용자 잔고 조회
    /// Get balance for a user
    ///
    /// # Returns
    /// * `Ok(BalanceResponse)` - 없는 사용자는 잔고 0
    /// * `Err(MissingParameter)` - 사용자 이름이 비어 있음
    /// * `Err(StoreUnavailable)` - 원장 조회 실패
    pub async fn get_balance(&self, user: &str) -> Result<BalanceResponse, LedgerError> {
        let user = normalize_user(user);
        if user.is_empty() {
            return Err(LedgerError::MissingParameter("user"));
        }

        let balance = self.ledger.get(&user).await?;

        Ok(BalanceResponse {
            user,
            symbol: self.symbol.clone(),
            balance,
        })
    }
}
