// Balance Handler
// 잔고 조회 핸들러

use crate::shared::services::AppState;
use crate::domains::ledger::models::{BalanceQuery, BalanceResponse};
use axum::{extract::{Query, State}, http::StatusCode, Json};

/// 사용자 잔고 조회 핸들러
/// Get balance for a user
///
/// 경로: GET /api/balance?user={user}
///
/// # Returns
/// * `200 OK` - 잔고 반환 (없는 사용자는 0)
/// * `400 Bad Request` - user 파라미터 누락/빈 값
/// * `500 Internal Server Error` - 원장 조회 실패
#[utoipa::path(
    get,
    path = "/api/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Missing user parameter"),
        (status = 500, description = "Ledger unavailable")
    ),
    tag = "Balances"
)]
pub async fn get_balance(
    State(app_state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceResponse>, (StatusCode, Json<serde_json::Value>)> {
    let user = query.user.unwrap_or_default();

    let balance = app_state
        .ledger_state
        .balance_service
        .get_balance(&user)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Balance query failed");
            <(StatusCode, Json<serde_json::Value>)>::from(e)
        })?;

    Ok(Json(balance))
}
