use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use chrono::{DateTime, Utc};

/// 입금 감시자 상태
/// Deposit watcher state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WatcherState {
    /// 폴링 주기 사이 대기 중
    Idle,
    /// 가져온 배치를 처리 중
    Processing,
    /// 종료됨
    Stopped,
}

/// 한 번의 폴링 주기 처리 결과
/// Outcome of one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CycleReport {
    /// 가져온 레코드 수
    pub fetched: usize,
    /// 새로 반영된 입금 수
    pub credited: usize,
    /// 이미 반영된 입금 (중복)
    pub duplicates: usize,
    /// 잘못된 레코드 (건너뜀)
    pub invalid: usize,
    /// 원장 저장 실패 (다음 주기에 재시도)
    pub failed: usize,
}

/// 입금 감시자 상태 응답 모델
/// Deposit watcher status response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = WatcherStatusResponse)]
pub struct WatcherStatusResponse {
    pub state: WatcherState,
    /// 완료된 폴링 주기 수 (조회 실패 포함)
    pub cycles: u64,
    /// 지금까지 반영된 입금 수
    pub credited_total: u64,
    /// 조회 실패 횟수
    pub fetch_failures: u64,
    /// 원장 저장 실패 횟수
    pub store_failures: u64,
    /// 현재 프로세스에서 반영된 트랜잭션 ID 수
    pub seen_transfers: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
    pub last_report: Option<CycleReport>,
    pub last_error: Option<String>,
}
