//! 匹配结果数据模型
//! 仅存储结果数据，支持序列化

use std::fmt;
use serde::{Deserialize, Serialize};

/// 单个链接匹配结果
///
/// 偏移均为原始文本中的 UTF-8 字节偏移，`last_index` 不含
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkMatch {
    /// 协议前缀（小写），模糊链接为空串
    pub schema: String,
    /// 起始偏移
    pub index: usize,
    /// 结束偏移（不含）
    pub last_index: usize,
    /// 原始匹配文本
    pub raw: String,
    /// 规范化后的展示文本
    pub text: String,
    /// 规范化后的链接
    pub url: String,
}

impl LinkMatch {
    /// 由扫描结果创建，`text` 与 `url` 初始等于原文
    pub(crate) fn new(schema: &str, index: usize, last_index: usize, raw: &str) -> Self {
        Self {
            schema: schema.to_lowercase(),
            index,
            last_index,
            raw: raw.to_string(),
            text: raw.to_string(),
            url: raw.to_string(),
        }
    }

    /// 匹配文本的字节长度
    pub fn len(&self) -> usize {
        self.last_index - self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index == self.last_index
    }

    /// 是否为无协议前缀的模糊链接
    pub fn is_fuzzy_link(&self) -> bool {
        self.schema.is_empty()
    }
}

// ======== Display 输出规范化链接 ========
impl fmt::Display for LinkMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
