//! 识别选项管理，存储所有可配置项
//! 任何选项变化都会触发模式集整体重编译

use serde::{Deserialize, Serialize};

use crate::error::{LinkifyError, LinkifyResult};

/// fancy-regex 默认回溯上限
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

/// 识别选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkifyOptions {
    // 识别无协议前缀的链接（example.com）
    pub fuzzy_link: bool,
    // 识别无 mailto: 前缀的邮箱
    pub fuzzy_email: bool,
    // 允许模糊链接以裸 IP 作为主机（可能误伤版本号）
    pub fuzzy_ip: bool,
    // 实验特性：`---` 截断路径与主机
    #[serde(rename = "---")]
    pub triple_dash: bool,
    // 环视正则的回溯步数上限，超限按未匹配处理
    pub backtrack_limit: usize,
}

impl Default for LinkifyOptions {
    fn default() -> Self {
        Self {
            fuzzy_link: true,
            fuzzy_email: true,
            fuzzy_ip: false,
            triple_dash: false,
            backtrack_limit: DEFAULT_BACKTRACK_LIMIT,
        }
    }
}

impl LinkifyOptions {
    /// 自定义选项
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }

    /// 应用部分更新，未指定字段保持原值
    pub fn apply(&mut self, patch: &PartialOptions) {
        if let Some(v) = patch.fuzzy_link {
            self.fuzzy_link = v;
        }
        if let Some(v) = patch.fuzzy_email {
            self.fuzzy_email = v;
        }
        if let Some(v) = patch.fuzzy_ip {
            self.fuzzy_ip = v;
        }
        if let Some(v) = patch.triple_dash {
            self.triple_dash = v;
        }
        if let Some(v) = patch.backtrack_limit {
            self.backtrack_limit = v;
        }
    }

    /// 从 JSON 文本解析完整选项（缺省字段取默认值）
    pub fn from_json_str(json: &str) -> LinkifyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 部分选项，用于 `Linkifier::set`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialOptions {
    pub fuzzy_link: Option<bool>,
    pub fuzzy_email: Option<bool>,
    pub fuzzy_ip: Option<bool>,
    #[serde(rename = "---")]
    pub triple_dash: Option<bool>,
    pub backtrack_limit: Option<usize>,
}

impl PartialOptions {
    pub fn fuzzy_link(mut self, v: bool) -> Self {
        self.fuzzy_link = Some(v);
        self
    }

    pub fn fuzzy_email(mut self, v: bool) -> Self {
        self.fuzzy_email = Some(v);
        self
    }

    pub fn fuzzy_ip(mut self, v: bool) -> Self {
        self.fuzzy_ip = Some(v);
        self
    }

    pub fn triple_dash(mut self, v: bool) -> Self {
        self.triple_dash = Some(v);
        self
    }

    pub fn backtrack_limit(mut self, v: usize) -> Self {
        self.backtrack_limit = Some(v);
        self
    }

    /// 从 JSON 解析部分选项，例如 `{"fuzzy_link": false}`
    pub fn from_json(value: &serde_json::Value) -> LinkifyResult<Self> {
        if !value.is_object() {
            return Err(LinkifyError::InvalidInput(format!(
                "options must be a JSON object, got {}",
                value
            )));
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// 选项构建器（便于链式自定义）
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    options: LinkifyOptions,
}

impl OptionsBuilder {
    pub fn new() -> Self {
        Self {
            options: LinkifyOptions::default(),
        }
    }

    pub fn fuzzy_link(mut self, v: bool) -> Self {
        self.options.fuzzy_link = v;
        self
    }

    pub fn fuzzy_email(mut self, v: bool) -> Self {
        self.options.fuzzy_email = v;
        self
    }

    pub fn fuzzy_ip(mut self, v: bool) -> Self {
        self.options.fuzzy_ip = v;
        self
    }

    pub fn triple_dash(mut self, v: bool) -> Self {
        self.options.triple_dash = v;
        self
    }

    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        self.options.backtrack_limit = limit;
        self
    }

    pub fn build(self) -> LinkifyOptions {
        self.options
    }
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
