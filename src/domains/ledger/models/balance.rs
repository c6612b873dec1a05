use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use rust_decimal::Decimal;

// =====================================================
// Balance 모델
// =====================================================
// 역할: 사용자별 내부 원장 잔고
// 
// 규칙:
// - key는 소문자로 정규화된 사용자 이름 ("Alice" == "alice")
// - 첫 입금 시 0으로 생성, 삭제되지 않음
// - 입금만 있으므로 잔고는 감소하지 않음
// =====================================================

/// 사용자 식별자 정규화 (앞뒤 공백 제거 + 소문자)
/// Normalize a user identity (trim + lowercase)
pub fn normalize_user(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 원장 잔고 레코드
/// Ledger balance record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// 정규화된 사용자 이름
    pub user: String,

    /// 현재 잔고
    pub balance: Decimal,
}

// =====================================================
// 잔고 조회 요청/응답 (Balance Query)
// =====================================================

/// 잔고 조회 쿼리 파라미터
/// Balance query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Hive account name (case-insensitive)
    #[param(example = "alice")]
    pub user: Option<String>,
}

/// 잔고 조회 응답 모델
/// Balance response model
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(as = BalanceResponse)]
pub struct BalanceResponse {
    /// Normalized user identity
    #[schema(example = "alice")]
    pub user: String,

    /// Configured token symbol
    #[schema(example = "PEK")]
    pub symbol: String,

    /// Current internal balance
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 8.0)]
    pub balance: Decimal,
}
