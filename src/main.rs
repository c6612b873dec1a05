use std::sync::Arc;
use anyhow::{Context, Result};
use axum::Router;
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use deposit_ledger::domains::deposits::models::{CycleReport, WatcherState, WatcherStatusResponse};
use deposit_ledger::domains::deposits::services::DepositWatcher;
use deposit_ledger::domains::deposits::source::DepositSource;
use deposit_ledger::domains::ledger::models::BalanceResponse;
use deposit_ledger::routes::create_router;
use deposit_ledger::shared::clients::HiveEngineClient;
use deposit_ledger::shared::config::AppConfig;
use deposit_ledger::shared::database::open_ledger_store;
use deposit_ledger::shared::services::AppState;

// OpenAPI 스키마 정의: Swagger 문서 자동 생성
#[derive(OpenApi)]
#[openapi(
    paths(
        deposit_ledger::domains::ledger::handlers::balance_handler::get_balance,
        deposit_ledger::domains::deposits::handlers::status_handler::get_watcher_status
    ),
    components(schemas(
        BalanceResponse,
        WatcherStatusResponse,
        WatcherState,
        CycleReport
    )),
    tags(
        (name = "Balances", description = "Internal ledger balance queries"),
        (name = "Deposits", description = "Deposit watcher status")
    ),
    info(
        title = "Deposit Ledger API",
        description = "Credits Hive Engine token deposits to an internal ledger and serves balances",
        version = "1.0.0"
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        account = %config.platform_account,
        symbol = %config.token_symbol,
        history_api = %config.history_api_url,
        poll_interval_secs = config.poll_interval.as_secs(),
        fetch_limit = config.fetch_limit,
        "Configuration loaded"
    );

    // 원장 저장소 (PostgreSQL 또는 WAL 파일)
    let ledger = open_ledger_store(&config).await?;

    // 입금 감시자 시작 (원장의 유일한 writer)
    let source: Arc<dyn DepositSource> = Arc::new(HiveEngineClient::new(&config)?);
    tracing::warn!(
        fetch_limit = config.fetch_limit,
        "Applied transfer ids are kept in memory only; transfers still inside the poll window are credited again after a restart"
    );
    let watcher = DepositWatcher::new(
        source,
        ledger.clone(),
        config.token_symbol.clone(),
        config.poll_interval,
    )
    .start();

    let app_state = AppState::new(&config, ledger, watcher.status().clone());

    // CORS 설정
    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(
            origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        ),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods([Method::GET, Method::OPTIONS])
    .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::ACCEPT]);

    let app = Router::new()
        .merge(create_router())
        .merge(SwaggerUi::new("/api").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .context(format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "Server running");
    tracing::info!("Swagger UI available at /api");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // 처리 중인 입금 배치가 끝난 뒤 종료
    watcher.shutdown().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
