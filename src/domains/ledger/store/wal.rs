// =====================================================
// WAL (Write-Ahead Logging) - 원장 변경 로그
// =====================================================
// 역할: 모든 잔고 변경을 디스크에 순차 기록하여 재시작 시 복구
// 
// 핵심 설계:
// 1. Append-only: 한 줄에 JSON 엔트리 하나
// 2. 매 엔트리마다 fsync(): 호출이 반환되면 디스크에 있음 (증가 유실 없음)
//    실패한 append는 파일에서 되돌림 (에러를 받은 엔트리가 재생되지 않음)
// 3. Recovery: 파일을 처음부터 재생하여 잔고 복원
// 4. 마지막 줄이 잘린 경우 (fsync 전 crash) 해당 줄은 확정되지 않은 것이므로 버림
// =====================================================

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// WAL 엔트리 (로그에 기록되는 잔고 변경)
///
/// Decimal은 문자열로 직렬화 (serde-with-str)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WalEntry {
    /// 입금 반영 (잔고 증가)
    Credited {
        user: String,
        #[serde(with = "rust_decimal::serde::str")]
        amount: Decimal,
        timestamp: i64,  // Unix timestamp (milliseconds)
    },

    /// 잔고 덮어쓰기 (수동 보정)
    BalanceSet {
        user: String,
        #[serde(with = "rust_decimal::serde::str")]
        balance: Decimal,
        timestamp: i64,
    },
}

impl WalEntry {
    pub fn credited(user: &str, amount: Decimal) -> Self {
        WalEntry::Credited {
            user: user.to_string(),
            amount,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn balance_set(user: &str, balance: Decimal) -> Self {
        WalEntry::BalanceSet {
            user: user.to_string(),
            balance,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// WAL Writer
///
/// append()는 매번 write + sync_all 까지 끝낸 뒤 반환.
/// 실패하면 마지막으로 확정된 길이까지 파일을 되돌려서, 에러를 받은 엔트리가
/// 나중에 재생되는 일이 없도록 함. 되돌리기도 실패하면 poisoned 상태가 되어
/// 다시 열 때까지 모든 append를 거부.
pub struct WalWriter {
    file: File,
    file_path: PathBuf,
    committed_len: u64,
    poisoned: bool,
}

impl WalWriter {
    /// WAL 파일 열기 (없으면 생성, append mode)
    ///
    /// `valid_len`이 주어지면 그 길이로 먼저 잘라냄 (잘린 마지막 줄 제거)
    pub fn open(file_path: &Path, valid_len: Option<u64>) -> Result<Self> {
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)
                .context("Failed to create WAL directory")?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)
            .context("Failed to open WAL file")?;

        let mut committed_len = file.metadata().context("Failed to stat WAL file")?.len();

        if let Some(len) = valid_len {
            if committed_len > len {
                file.set_len(len)
                    .context("Failed to truncate torn WAL tail")?;
                file.sync_all()
                    .context("Failed to sync truncated WAL")?;
                committed_len = len;
            }
        }

        Ok(Self {
            file,
            file_path: file_path.to_path_buf(),
            committed_len,
            poisoned: false,
        })
    }

    /// WAL에 엔트리 추가 후 디스크 동기화
    ///
    /// # Process
    /// 1. 엔트리를 JSON 한 줄로 직렬화
    /// 2. 파일에 쓰기 (버퍼 없음, 실패한 바이트가 다음 append에 섞이지 않음)
    /// 3. sync_all (커널 → 디스크)
    /// 4. 실패하면 확정된 길이로 되돌림
    pub fn append(&mut self, entry: &WalEntry) -> Result<()> {
        if self.poisoned {
            bail!(
                "WAL writer for {} is poisoned after a failed rollback; reopen required",
                self.file_path.display()
            );
        }

        let mut line = serde_json::to_string(entry)
            .context("Failed to serialize WAL entry")?;
        line.push('\n');

        if let Err(e) = self.write_and_sync(line.as_bytes()) {
            if let Err(rollback_err) = self.rollback() {
                tracing::error!(
                    path = %self.file_path.display(),
                    error = %format!("{:#}", rollback_err),
                    "WAL rollback failed; refusing further writes"
                );
            }
            return Err(e);
        }

        self.committed_len += line.len() as u64;
        Ok(())
    }

    fn write_and_sync(&mut self, bytes: &[u8]) -> Result<()> {
        self.file.write_all(bytes)
            .context("Failed to write WAL entry")?;
        self.file.sync_all()
            .context("Failed to sync WAL to disk")?;
        Ok(())
    }

    /// 확정되지 않은 바이트 제거 (마지막 성공 append 직후 길이로 되돌림)
    pub(crate) fn rollback(&mut self) -> Result<()> {
        let result = self
            .file
            .set_len(self.committed_len)
            .and_then(|_| self.file.sync_all());

        if let Err(e) = result {
            self.poisoned = true;
            return Err(e).context("Failed to roll back uncommitted WAL bytes");
        }
        Ok(())
    }

    /// 확정된 엔트리까지의 바이트 길이
    pub fn committed_len(&self) -> u64 {
        self.committed_len
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// WAL 파일 경로
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// WAL 재생 결과
#[derive(Debug, Default)]
pub struct WalReplay {
    /// 확정된 엔트리 (기록 순서)
    pub entries: Vec<WalEntry>,
    /// 확정된 엔트리까지의 바이트 길이
    pub valid_len: u64,
    /// 마지막 줄이 잘려서 버렸는지
    pub torn_tail: bool,
}

/// WAL Reader (복구용)
pub struct WalReader {
    file_path: PathBuf,
}

impl WalReader {
    pub fn new(file_path: PathBuf) -> Self {
        Self { file_path }
    }

    /// WAL 파일의 모든 엔트리 읽기
    ///
    /// 파일이 없으면 빈 결과.
    /// 개행으로 끝나지 않는 마지막 줄은 fsync 전에 중단된 쓰기이므로 버림.
    /// 그 외 위치의 파싱 실패는 손상으로 보고 에러.
    pub fn replay(&self) -> Result<WalReplay> {
        if !self.file_path.exists() {
            return Ok(WalReplay::default());
        }

        let file = File::open(&self.file_path)
            .context("Failed to open WAL file for reading")?;
        let mut reader = BufReader::new(file);

        let mut replay = WalReplay::default();
        let mut line = String::new();
        let mut line_num = 0usize;

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .context(format!("Failed to read WAL line {}", line_num + 1))?;
            if read == 0 {
                break;
            }
            line_num += 1;

            if !line.ends_with('\n') {
                replay.torn_tail = true;
                break;
            }

            let entry: WalEntry = match serde_json::from_str(line.trim_end()) {
                Ok(entry) => entry,
                Err(e) => bail!("Corrupt WAL entry at line {}: {}", line_num, e),
            };

            replay.entries.push(entry);
            replay.valid_len += read as u64;
        }

        Ok(replay)
    }
}
