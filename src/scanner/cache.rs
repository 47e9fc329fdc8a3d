//! 扫描缓存：记录最近一次 `test` 的结果，供紧随其后的 `matches` 复用
use std::hash::{DefaultHasher, Hash, Hasher};

/// 单个扫描命中（偏移相对于被扫描的文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
    /// 小写 schema 名，模糊链接为空串
    pub schema: String,
    pub index: usize,
    pub last_index: usize,
}

impl ScanHit {
    pub fn new(schema: impl Into<String>, index: usize, last_index: usize) -> Self {
        Self {
            schema: schema.into(),
            index,
            last_index,
        }
    }

    /// 是否优于当前最佳：起点更靠左，起点相同时终点更靠右
    pub fn outranks(&self, best: Option<&ScanHit>) -> bool {
        match best {
            None => true,
            Some(b) => self.index < b.index || (self.index == b.index && self.last_index > b.last_index),
        }
    }
}

/// 缓存状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Idle,
    Cached(ScanHit),
}

/// 扫描缓存，绑定到计算它时使用的文本
/// 只记录文本指纹（字节长度 + 哈希），不保存文本副本
#[derive(Debug, Clone, Default)]
pub struct ScanCache {
    fingerprint: Option<(usize, u64)>,
    state: ScanState,
}

fn fingerprint(text: &str) -> (usize, u64) {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    (text.len(), hasher.finish())
}

impl ScanCache {
    /// 回到 Idle
    pub fn reset(&mut self) {
        self.fingerprint = None;
        self.state = ScanState::Idle;
    }

    /// 记录 `text` 上的命中
    pub fn store(&mut self, text: &str, hit: ScanHit) {
        self.fingerprint = Some(fingerprint(text));
        self.state = ScanState::Cached(hit);
    }

    /// 仅当缓存对应的正是同一段文本时返回命中
    pub fn hit(&self, text: &str) -> Option<&ScanHit> {
        match (&self.state, self.fingerprint) {
            (ScanState::Cached(hit), Some(key)) if key == fingerprint(text) => Some(hit),
            _ => None,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }
}
