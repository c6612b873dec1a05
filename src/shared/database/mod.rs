// Database module
pub mod connection;
pub mod repositories;

pub use connection::*;
pub use repositories::*;

use std::sync::Arc;
use anyhow::{Context, Result};
use crate::domains::ledger::store::{LedgerStore, WalLedgerStore};
use crate::shared::config::AppConfig;

/// 설정에 맞는 원장 저장소 열기
/// Open the ledger store selected by configuration
///
/// - DATABASE_URL 있음: PostgreSQL (마이그레이션 실행)
/// - 없음: LEDGER_DATA_DIR의 WAL 파일
pub async fn open_ledger_store(config: &AppConfig) -> Result<Arc<dyn LedgerStore>> {
    match &config.database_url {
        Some(db_url) => {
            let db = Database::new(db_url).await?;
            db.initialize().await?;
            tracing::info!("Ledger backend: PostgreSQL");
            Ok(Arc::new(BalanceRepository::new(db.pool().clone())))
        }
        None => {
            let dir = config.ledger_data_dir.clone();
            let store = tokio::task::spawn_blocking(move || WalLedgerStore::open(&dir))
                .await
                .context("WAL open task failed")??;
            tracing::info!(
                dir = %config.ledger_data_dir.display(),
                "Ledger backend: WAL file"
            );
            Ok(Arc::new(store))
        }
    }
}
