use std::collections::HashSet;

/// 중복 제거 추적기
/// Deduplication tracker
///
/// 이미 원장에 반영된 트랜잭션 ID 집합.
/// - 감시자 태스크만 소유하고 수정 (다른 태스크와 공유하지 않음 → 락 불필요)
/// - 영속화하지 않음: 재시작하면 비어 있음
/// - 프로세스 수명 동안 계속 증가 (poll window가 유한하므로 증가 속도도 유한)
#[derive(Debug, Default)]
pub struct SeenTransfers {
    ids: HashSet<String>,
}

impl SeenTransfers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 아직 반영되지 않은 ID인지
    pub fn is_new(&self, tx_id: &str) -> bool {
        !self.ids.contains(tx_id)
    }

    /// 반영 완료로 표시 (원장 증가가 성공한 뒤에만 호출)
    pub fn mark_seen(&mut self, tx_id: &str) {
        self.ids.insert(tx_id.to_string());
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
