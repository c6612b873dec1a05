use std::str::FromStr;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use rust_decimal::Decimal;
use crate::domains::ledger::models::normalize_user;
use crate::shared::errors::LedgerError;

// =====================================================
// TransferRecord 모델
// =====================================================
// 역할: Hive Engine transfers 테이블의 원시 레코드
// 
// 예시:
// { "_id": "a1b2...", "from": "Alice", "to": "yourplatformaccount",
//   "symbol": "PEK", "quantity": "5.000" }
// 
// 주의:
// - 필드가 없거나 타입이 달라도 디코딩은 성공해야 함
//   (레코드 하나가 잘못됐다고 배치 전체를 버리지 않음)
// - 검증은 to_deposit()에서 레코드 단위로 수행
// =====================================================

/// 외부 피드의 원시 전송 레코드
/// Raw transfer record from the external feed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferRecord {
    /// 고유 트랜잭션 ID (문자열 또는 숫자)
    #[serde(rename = "_id", default)]
    pub id: Option<Value>,

    /// 보낸 사람 (Hive 계정)
    #[serde(default)]
    pub from: Option<Value>,

    /// 수량 (문자열 또는 숫자)
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl TransferRecord {
    /// 테스트/시뮬레이션용 생성자
    pub fn new(id: &str, from: &str, quantity: &str) -> Self {
        Self {
            id: Some(Value::String(id.to_string())),
            from: Some(Value::String(from.to_string())),
            quantity: Some(Value::String(quantity.to_string())),
        }
    }

    /// 로그용 ID (없으면 "<missing>")
    pub fn display_id(&self) -> String {
        value_to_string(self.id.as_ref()).unwrap_or_else(|| "<missing>".to_string())
    }

    /// 검증 후 DepositEvent로 변환
    /// Validate the raw record into a deposit event
    ///
    /// # Returns
    /// * `Ok(DepositEvent)` - 정상 입금
    /// * `Err(InvalidCandidate)` - ID 없음, 보낸 사람 없음, 수량 파싱 실패, 수량 <= 0
    pub fn to_deposit(&self) -> Result<DepositEvent, LedgerError> {
        let invalid = |reason: &str| LedgerError::InvalidCandidate {
            id: self.display_id(),
            reason: reason.to_string(),
        };

        let tx_id = value_to_string(self.id.as_ref())
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| invalid("missing transaction id"))?;

        let user = match &self.from {
            Some(Value::String(from)) => normalize_user(from),
            _ => String::new(),
        };
        if user.is_empty() {
            return Err(invalid("empty source identity"));
        }

        let quantity = self
            .quantity
            .as_ref()
            .and_then(parse_quantity)
            .ok_or_else(|| invalid("unparseable quantity"))?;
        if quantity <= Decimal::ZERO {
            return Err(invalid("non-positive quantity"));
        }

        Ok(DepositEvent { tx_id, user, quantity })
    }
}

/// 검증된 입금 이벤트
/// Validated deposit event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositEvent {
    /// 트랜잭션 ID (중복 제거 key)
    pub tx_id: String,
    /// 정규화된 보낸 사람
    pub user: String,
    /// 양수 수량
    pub quantity: Decimal,
}

fn value_to_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 수량 파싱 ("5", "5.000", 5, 5.5, "1e3")
fn parse_quantity(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}
