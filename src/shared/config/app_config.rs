use std::path::PathBuf;
use std::time::Duration;
use anyhow::{bail, Result};

/// 애플리케이션 설정
/// Application configuration
///
/// 시작 시 환경변수에서 한 번 읽고 이후 변경하지 않음 (hot reload 없음)
/// Read once from environment variables at startup, fixed afterwards
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 입금을 받는 플랫폼 Hive 계정
    /// Platform's receiving Hive account
    pub platform_account: String,

    /// 토큰 심볼 (모든 응답에서 동일)
    /// Token symbol, constant across all responses
    pub token_symbol: String,

    /// Hive Engine history API endpoint
    pub history_api_url: String,

    /// 입금 조회 주기
    /// Deposit poll period
    pub poll_interval: Duration,

    /// 한 번에 조회할 최근 전송 개수 (poll window)
    /// Number of most recent transfers fetched per poll
    pub fetch_limit: usize,

    /// 외부 API 요청 타임아웃
    /// Transport-level timeout for the history API
    pub http_timeout: Duration,

    /// PostgreSQL 연결 문자열 (없으면 WAL 파일 원장 사용)
    /// PostgreSQL URL; the WAL file ledger is used when unset
    pub database_url: Option<String>,

    /// WAL 원장 디렉토리
    /// Directory of the WAL-backed ledger
    pub ledger_data_dir: PathBuf,

    /// HTTP 서버 주소
    pub bind_addr: String,

    /// CORS 허용 origin (없으면 모두 허용)
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            platform_account: "yourplatformaccount".to_string(),
            token_symbol: "PEK".to_string(),
            history_api_url: "https://api.hive-engine.com/rpc/history".to_string(),
            poll_interval: Duration::from_secs(30),
            fetch_limit: 100,
            http_timeout: Duration::from_secs(15),
            database_url: None,
            ledger_data_dir: PathBuf::from("./data"),
            bind_addr: "0.0.0.0:5000".to_string(),
            cors_origin: None,
        }
    }
}

impl AppConfig {
    /// 환경변수에서 설정 로드
    /// Load configuration from environment variables
    ///
    /// 환경변수가 없거나 숫자 파싱에 실패하면 기본값 사용
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 key 조회 함수로 설정 로드 (테스트에서 환경변수 대신 사용)
    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // 빈 문자열은 설정되지 않은 것으로 취급
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_interval = get("POLL_INTERVAL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.poll_interval);

        let fetch_limit = get("FETCH_LIMIT")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.fetch_limit);

        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let config = Self {
            platform_account: get("PLATFORM_ACCOUNT").unwrap_or(defaults.platform_account),
            token_symbol: get("TOKEN_SYMBOL").unwrap_or(defaults.token_symbol),
            history_api_url: get("HISTORY_API_URL").unwrap_or(defaults.history_api_url),
            poll_interval,
            fetch_limit,
            http_timeout,
            database_url: get("DATABASE_URL"),
            ledger_data_dir: get("LEDGER_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.ledger_data_dir),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cors_origin: get("CORS_ORIGIN"),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            bail!("POLL_INTERVAL_SECS must be greater than zero");
        }
        if self.fetch_limit == 0 {
            bail!("FETCH_LIMIT must be greater than zero");
        }
        if self.platform_account.is_empty() || self.token_symbol.is_empty() {
            bail!("PLATFORM_ACCOUNT and TOKEN_SYMBOL must not be empty");
        }
        Ok(())
    }
}
