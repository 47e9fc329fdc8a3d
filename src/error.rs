//! 全局错误类型定义

use thiserror::Error;
use regex::Error as RegexError;
use fancy_regex::Error as FancyRegexError;
use serde_json::Error as SerdeJsonError;

#[derive(Error, Debug)]
pub enum LinkifyError {
    // 规则相关错误
    /// schema 定义非法（非字符串别名、非正则、非函数，或正则源码无法编译）
    #[error("(LinkifyIt) Invalid schema '{name}': '{value}'")]
    Schema { name: String, value: String },

    // 编译相关错误
    #[error("正则编译失败：{0}")]
    RegexCompile(#[from] RegexError),
    #[error("环视正则编译失败：{0}")]
    FancyRegexCompile(#[from] FancyRegexError),

    // 配置相关错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl LinkifyError {
    /// 构造 schema 配置错误，`value` 为非法定义的描述
    pub fn schema(name: impl Into<String>, value: impl ToString) -> Self {
        LinkifyError::Schema {
            name: name.into(),
            value: value.to_string(),
        }
    }
}

// 全局Result类型
pub type LinkifyResult<T> = Result<T, LinkifyError>;
