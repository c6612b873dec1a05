use thiserror::Error;
use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use serde_json::json;

/// 입금/원장 관련 에러
/// Deposit and ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    /// 입금 내역 조회 실패 (네트워크/파싱 오류) - 다음 주기에 재시도
    /// Fetching deposits failed (transport or malformed response), retried next cycle
    #[error("Deposit source unavailable: {0}")]
    SourceUnavailable(String),

    /// 잘못된 입금 레코드 - 건너뜀
    /// Malformed deposit record, skipped by the watcher
    #[error("Invalid deposit candidate {id}: {reason}")]
    InvalidCandidate { id: String, reason: String },

    /// 원장 저장소 읽기/쓰기 실패
    /// Ledger read/write failure
    #[error("Ledger store unavailable: {0}")]
    StoreUnavailable(String),

    /// 필수 파라미터 누락
    /// Required parameter missing
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    /// 잘못된 금액 (증가는 양수, 설정은 0 이상)
    /// Amount rejected by the store contract
    #[error("Invalid amount: {0}")]
    InvalidAmount(Decimal),
}

impl LedgerError {
    /// anyhow 에러 체인을 StoreUnavailable로 변환
    pub fn store(err: anyhow::Error) -> Self {
        LedgerError::StoreUnavailable(format!("{:#}", err))
    }

    /// anyhow 에러 체인을 SourceUnavailable로 변환
    pub fn source(err: anyhow::Error) -> Self {
        LedgerError::SourceUnavailable(format!("{:#}", err))
    }
}

/// LedgerError를 HTTP 응답으로 변환
impl From<LedgerError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::MissingParameter(_) | LedgerError::InvalidAmount(_) => {
                StatusCode::BAD_REQUEST
            }
            // InvalidCandidate / SourceUnavailable는 입금 감시자 내부에서만 발생
            LedgerError::StoreUnavailable(_)
            | LedgerError::InvalidCandidate { .. }
            | LedgerError::SourceUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": err.to_string() })))
    }
}
