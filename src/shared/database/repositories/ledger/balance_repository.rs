use sqlx::PgPool;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use crate::domains::ledger::models::normalize_user;
use crate::domains::ledger::store::{credit_key, set_key, LedgerStore};
use crate::shared::errors::LedgerError;

/// PostgreSQL 원장 저장소 (balances 테이블)
/// PostgreSQL-backed ledger (`balances` table)
///
/// 증가는 INSERT ... ON CONFLICT DO UPDATE 한 문장으로 처리 →
/// 행 락 안에서 읽기-수정-쓰기가 끝나므로 동시 증가가 유실되지 않음
#[derive(Clone)]
pub struct BalanceRepository {
    pool: PgPool,
}

impl BalanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 잔고 증가 (없으면 생성), 증가 후 잔고 반환
    /// Credit balance (upsert), returns new balance
    pub async fn credit(&self, username: &str, amount: Decimal) -> Result<Decimal> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            INSERT INTO balances (username, balance, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (username)
            DO UPDATE SET
                balance = balances.balance + EXCLUDED.balance,
                updated_at = NOW()
            RETURNING balance
            "#,
        )
        .bind(username)
        .bind(amount)
        .fetch_one(&self.pool)
        .await
        .context("Failed to credit balance")?;

        Ok(balance)
    }

    /// 잔고 덮어쓰기 (없으면 생성)
    /// Overwrite balance (upsert)
    pub async fn upsert(&self, username: &str, balance: Decimal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO balances (username, balance, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (username)
            DO UPDATE SET
                balance = EXCLUDED.balance,
                updated_at = NOW()
            "#,
        )
        .bind(username)
        .bind(balance)
        .execute(&self.pool)
        .await
        .context("Failed to set balance")?;

        Ok(())
    }

    /// 사용자 잔고 조회
    /// Get balance by username
    pub async fn find_balance(&self, username: &str) -> Result<Option<Decimal>> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM balances WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch balance by username")?;

        Ok(balance)
    }
}

// PostgreSQL numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// balances.balance(NUMERIC(28, 8)) 범위 초과는 재시도해도 성공할 수 없으므로 InvalidAmount,
/// 그 외는 StoreUnavailable. 두 경우 모두 문장이 실패해서 아무것도 커밋되지 않음.
fn classify(err: anyhow::Error, amount: Decimal) -> LedgerError {
    let out_of_range = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|e| e.code())
        .is_some_and(|code| code == NUMERIC_OUT_OF_RANGE);

    if out_of_range {
        LedgerError::InvalidAmount(amount)
    } else {
        LedgerError::store(err)
    }
}

#[async_trait]
impl LedgerStore for BalanceRepository {
    async fn increment(&self, user: &str, amount: Decimal) -> Result<Decimal, LedgerError> {
        let key = credit_key(user, amount)?;
        self.credit(&key, amount).await.map_err(|e| classify(e, amount))
    }

    async fn set(&self, user: &str, amount: Decimal) -> Result<(), LedgerError> {
        let key = set_key(user, amount)?;
        self.upsert(&key, amount).await.map_err(|e| classify(e, amount))
    }

    async fn get(&self, user: &str) -> Result<Decimal, LedgerError> {
        let balance = self
            .find_balance(&normalize_user(user))
            .await
            .map_err(LedgerError::store)?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }
}
