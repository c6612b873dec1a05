// Routes module: 라우팅 설정
// Routes module: combines all domain routers

use axum::{routing::get, Router};
use crate::shared::services::AppState;

use crate::domains::ledger::routes::create_ledger_router;
use crate::domains::deposits::routes::create_deposits_router;

/// Create main router (combines all domain routers)
/// 메인 라우터 생성 (모든 도메인 라우터 조합)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/balance", create_ledger_router())
        .nest("/api/deposits", create_deposits_router())
}

async fn health() -> &'static str {
    "ok"
}
