// Deposit Watcher Status Handler
// 입금 감시자 상태 핸들러

use crate::shared::services::AppState;
use crate::domains::deposits::models::WatcherStatusResponse;
use axum::{extract::State, Json};

/// 입금 감시자 상태 조회
/// Get deposit watcher status
///
/// 경로: GET /api/deposits/status
#[utoipa::path(
    get,
    path = "/api/deposits/status",
    responses(
        (status = 200, description = "Watcher status", body = WatcherStatusResponse)
    ),
    tag = "Deposits"
)]
pub async fn get_watcher_status(
    State(app_state): State<AppState>,
) -> Json<WatcherStatusResponse> {
    Json(app_state.deposit_state.watcher_status.snapshot())
}
