use axum::{routing::get, Router};
use crate::shared::services::AppState;

use super::handlers;

/// 원장 라우터 생성
/// Create ledger router
///
/// # Routes
/// - `GET /api/balance?user=` - 사용자 잔고 조회
pub fn create_ledger_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_balance))
}
