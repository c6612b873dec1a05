use axum::{routing::get, Router};
use crate::shared::services::AppState;

use super::handlers;

/// 입금 라우터 생성
/// Create deposits router
///
/// # Routes
/// - `GET /api/deposits/status` - 입금 감시자 상태
pub fn create_deposits_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::get_watcher_status))
}
