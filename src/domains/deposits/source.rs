use async_trait::async_trait;
use crate::domains::deposits::models::TransferRecord;
use crate::shared::errors::LedgerError;

/// 입금 내역 소스 인터페이스
/// Deposit source interface
///
/// 플랫폼 계정으로 들어온 최근 전송 N개를 최신순으로 반환합니다.
/// 순서/중복은 보장하지 않는 재조회 가능한 목록이며, 오래된 전송은 window 밖으로 밀려납니다.
///
/// # 구현체
/// - `HiveEngineClient`: Hive Engine history API (JSON-RPC)
/// - 테스트: 미리 정해진 배치를 돌려주는 fake
#[async_trait]
pub trait DepositSource: Send + Sync {
    /// 최근 전송 조회
    /// Fetch the most recent transfers to the platform account
    ///
    /// # Returns
    /// * `Ok(Vec<TransferRecord>)` - 빈 목록도 정상
    /// * `Err(SourceUnavailable)` - 네트워크 오류, 잘못된 응답
    async fn fetch_recent_transfers(&self) -> Result<Vec<TransferRecord>, LedgerError>;
}
