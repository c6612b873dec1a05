// =====================================================
// Hive Engine 클라이언트 통합 테스트
// =====================================================
// 로컬 axum 서버로 history API를 흉내냄 (외부 네트워크 없음)

mod common;
use common::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use deposit_ledger::domains::deposits::source::DepositSource;
use deposit_ledger::domains::ledger::store::BalanceBook;
use deposit_ledger::shared::clients::HiveEngineClient;
use deposit_ledger::shared::config::AppConfig;
use deposit_ledger::shared::errors::LedgerError;

#[derive(Clone)]
struct FakeApi {
    status: StatusCode,
    response: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn history(State(api): State<FakeApi>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    api.requests.lock().push(body);
    (api.status, Json(api.response.clone()))
}

async fn serve(api: FakeApi) -> SocketAddr {
    let app = Router::new().route("/rpc/history", post(history)).with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> HiveEngineClient {
    let config = AppConfig {
        platform_account: "pokerhouse".to_string(),
        token_symbol: TEST_SYMBOL.to_string(),
        history_api_url: format!("http://{}/rpc/history", addr),
        fetch_limit: 100,
        http_timeout: Duration::from_secs(5),
        ..AppConfig::default()
    };
    HiveEngineClient::new(&config).unwrap()
}

fn fake(status: StatusCode, response: Value) -> FakeApi {
    FakeApi {
        status,
        response,
        requests: Arc::new(Mutex::new(Vec::new())),
    }
}

/// 테스트: 요청 형식과 응답 파싱
#[tokio::test]
async fn test_fetch_recent_transfers() {
    let api = fake(
        StatusCode::OK,
        json!({"jsonrpc": "2.0", "id": 1, "result": [
            {"_id": "a", "from": "Alice", "to": "pokerhouse", "symbol": "PEK", "quantity": "5"},
            {"_id": "b", "from": "alice", "to": "pokerhouse", "symbol": "PEK", "quantity": "3"}
        ]}),
    );
    let requests = api.requests.clone();
    let addr = serve(api).await;

    let transfers = client(addr).fetch_recent_transfers().await.unwrap();
    assert_eq!(transfers.len(), 2);

    let sent = requests.lock().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["method"], "find");
    assert_eq!(sent[0]["params"]["contract"], "tokens");
    assert_eq!(sent[0]["params"]["query"], json!({"to": "pokerhouse", "symbol": "PEK"}));
    assert_eq!(sent[0]["params"]["limit"], 100);
    assert_eq!(sent[0]["params"]["sort"], "desc");
}

/// 테스트: HTTP 에러, RPC 에러는 SourceUnavailable
#[tokio::test]
async fn test_errors_are_source_unavailable() {
    let addr = serve(fake(StatusCode::BAD_GATEWAY, json!({"error": "upstream"}))).await;
    assert!(matches!(
        client(addr).fetch_recent_transfers().await,
        Err(LedgerError::SourceUnavailable(_))
    ));

    let addr = serve(fake(StatusCode::OK, json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32600}}))).await;
    assert!(matches!(
        client(addr).fetch_recent_transfers().await,
        Err(LedgerError::SourceUnavailable(_))
    ));
}

/// 테스트: 연결 실패도 SourceUnavailable
#[tokio::test]
async fn test_connection_refused_is_source_unavailable() {
    // 바인드 후 바로 닫아서 사용되지 않는 포트 확보
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    assert!(matches!(
        client(addr).fetch_recent_transfers().await,
        Err(LedgerError::SourceUnavailable(_))
    ));
}

/// 테스트: 실제 클라이언트 + 감시자 + 원장 전체 흐름
#[tokio::test]
async fn test_watcher_with_hive_engine_client() {
    let addr = serve(fake(
        StatusCode::OK,
        json!({"jsonrpc": "2.0", "id": 1, "result": [
            {"_id": "b", "from": "alice", "quantity": "3"},
            {"_id": "a", "from": "Alice", "quantity": "5"},
            {"_id": "z", "from": "bob", "quantity": "0"}
        ]}),
    ))
    .await;

    let ledger = Arc::new(BalanceBook::new());
    let mut watcher = watcher(Arc::new(client(addr)), ledger.clone());

    let first = watcher.run_cycle().await.unwrap();
    let second = watcher.run_cycle().await.unwrap();

    assert_eq!(first.credited, 2);
    assert_eq!(first.invalid, 1);
    assert_eq!(second.credited, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(ledger.balance("alice"), dec("8"));
    assert_eq!(ledger.balance("bob"), dec("0"));
}
