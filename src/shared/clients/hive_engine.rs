use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use crate::domains::deposits::models::TransferRecord;
use crate::domains::deposits::source::DepositSource;
use crate::shared::config::AppConfig;
use crate::shared::errors::LedgerError;

// Hive Engine history API 클라이언트
// Hive Engine history API client
//
// tokens.transfers 테이블에서 플랫폼 계정으로 들어온 전송을 최신순으로 조회
pub struct HiveEngineClient {
    http_client: reqwest::Client,
    history_url: String,
    account: String,
    symbol: String,
    limit: usize,
}

// JSON-RPC 응답 (result 또는 error)
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Vec<TransferRecord>>,
    #[serde(default)]
    error: Option<Value>,
}

impl HiveEngineClient {
    // 클라이언트 생성
    // Create new client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            history_url: config.history_api_url.clone(),
            account: config.platform_account.clone(),
            symbol: config.token_symbol.clone(),
            limit: config.fetch_limit,
        })
    }

    // JSON-RPC find 요청 본문
    // Build the JSON-RPC `find` request body
    pub fn request_body(&self) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": "find",
            "params": {
                "contract": "tokens",
                "table": "transfers",
                "query": { "to": self.account, "symbol": self.symbol },
                "limit": self.limit,
                "sort": "desc"
            },
            "id": 1
        })
    }

    // 최근 전송 조회: history API 호출
    // Fetch recent transfers: call history API
    pub async fn find_transfers(&self) -> Result<Vec<TransferRecord>> {
        let response = self
            .http_client
            .post(&self.history_url)
            .header("User-Agent", "deposit-ledger/1.0")
            .json(&self.request_body())
            .send()
            .await
            .context("Failed to send request to Hive Engine history API")?;

        // HTTP 상태 코드 확인
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Hive Engine history API returned error: {} - {}", status, body);
        }

        let body = response
            .bytes()
            .await
            .context("Failed to read Hive Engine history API response")?;

        decode_response(&body)
    }
}

// JSON-RPC 응답 파싱
// result가 없거나 error가 있으면 실패 (빈 배열은 정상)
fn decode_response(body: &[u8]) -> Result<Vec<TransferRecord>> {
    let rpc: RpcResponse = serde_json::from_slice(body)
        .context("Failed to parse Hive Engine history API response")?;

    if let Some(error) = rpc.error {
        bail!("Hive Engine history API returned RPC error: {}", error);
    }

    rpc.result
        .context("Hive Engine history API response has no result")
}

#[async_trait]
impl DepositSource for HiveEngineClient {
    async fn fetch_recent_transfers(&self) -> Result<Vec<TransferRecord>, LedgerError> {
        self.find_transfers().await.map_err(LedgerError::source)
    }
}
