//! 编译后模式模型
//! 正则编译后的结构，以及一次编译产出的完整模式集快照

use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

use fancy_regex::{Regex as FancyRegex, RegexBuilder as FancyRegexBuilder};
use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::assembler::PatternSources;
use crate::error::{LinkifyError, LinkifyResult};
use crate::rule::validator::{Normalizer, Validator};

// 模板里 Unicode 字符类会被重复展开多次，默认 10MB 上限不够用
const REGEX_SIZE_LIMIT: usize = 64 * (1 << 20);

/// 编译后的匹配器
/// 无环视的模式走 regex（线性时间），需要环视的走 fancy-regex（回溯步数受限）
#[derive(Debug, Clone)]
pub enum Matcher {
    Basic(Regex),
    Fancy(FancyRegex),
}

/// 一次匹配的各分组区间（0 为整体匹配）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpans {
    groups: Vec<Option<Range<usize>>>,
}

impl MatchSpans {
    pub fn whole(&self) -> Range<usize> {
        self.group(0).unwrap_or(0..0)
    }

    pub fn group(&self, index: usize) -> Option<Range<usize>> {
        self.groups.get(index).cloned().flatten()
    }

    /// 分组长度，未参与匹配的分组视为 0
    pub fn group_len(&self, index: usize) -> usize {
        self.group(index).map(|r| r.len()).unwrap_or(0)
    }

    fn from_basic(caps: &regex::Captures<'_>) -> Self {
        Self {
            groups: caps.iter().map(|m| m.map(|m| m.range())).collect(),
        }
    }

    fn from_fancy(caps: &fancy_regex::Captures<'_>) -> Self {
        Self {
            groups: caps.iter().map(|m| m.map(|m| m.start()..m.end())).collect(),
        }
    }
}

impl Matcher {
    /// 编译模式：先尝试 regex，不支持的语法（环视）再升级为 fancy-regex
    pub fn compile(source: &str, case_insensitive: bool, backtrack_limit: usize) -> LinkifyResult<Self> {
        match RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
        {
            Ok(re) => Ok(Matcher::Basic(re)),
            Err(_) => Self::compile_fancy(source, case_insensitive, backtrack_limit),
        }
    }

    /// 强制使用 fancy-regex 编译
    pub fn compile_fancy(source: &str, case_insensitive: bool, backtrack_limit: usize) -> LinkifyResult<Self> {
        let pattern = if case_insensitive {
            format!("(?i){}", source)
        } else {
            source.to_string()
        };
        let re = FancyRegexBuilder::new(&pattern)
            .backtrack_limit(backtrack_limit)
            .delegate_size_limit(REGEX_SIZE_LIMIT)
            .build()?;
        Ok(Matcher::Fancy(re))
    }

    /// 仅编译 regex，不允许升级（用于必须保持线性时间的预筛模式）
    pub fn compile_basic(source: &str, case_insensitive: bool) -> LinkifyResult<Self> {
        let re = RegexBuilder::new(source)
            .case_insensitive(case_insensitive)
            .size_limit(REGEX_SIZE_LIMIT)
            .build()
            .map_err(LinkifyError::from)?;
        Ok(Matcher::Basic(re))
    }

    /// 是否存在匹配
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Basic(re) => re.is_match(text),
            Matcher::Fancy(re) => re.is_match(text).unwrap_or_else(|e| {
                warn!("环视正则执行中止（按未匹配处理）：{}", e);
                false
            }),
        }
    }

    /// 最左匹配区间
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            Matcher::Basic(re) => re.find(text).map(|m| m.range()),
            Matcher::Fancy(re) => match re.find(text) {
                Ok(m) => m.map(|m| m.start()..m.end()),
                Err(e) => {
                    warn!("环视正则执行中止（按未匹配处理）：{}", e);
                    None
                }
            },
        }
    }

    /// 最左匹配及其分组
    pub fn captures(&self, text: &str) -> Option<MatchSpans> {
        match self {
            Matcher::Basic(re) => re.captures(text).map(|c| MatchSpans::from_basic(&c)),
            Matcher::Fancy(re) => match re.captures(text) {
                Ok(c) => c.map(|c| MatchSpans::from_fancy(&c)),
                Err(e) => {
                    warn!("环视正则执行中止（按未匹配处理）：{}", e);
                    None
                }
            },
        }
    }

    /// 从左到右遍历所有不重叠匹配
    pub fn captures_iter<'a>(&'a self, text: &'a str) -> Box<dyn Iterator<Item = MatchSpans> + 'a> {
        match self {
            Matcher::Basic(re) => Box::new(re.captures_iter(text).map(|c| MatchSpans::from_basic(&c))),
            Matcher::Fancy(re) => Box::new(re.captures_iter(text).map_while(|c| match c {
                Ok(c) => Some(MatchSpans::from_fancy(&c)),
                Err(e) => {
                    warn!("环视正则执行中止（按未匹配处理）：{}", e);
                    None
                }
            })),
        }
    }

    /// 锚定在文本开头的匹配长度，未匹配返回 0
    pub fn match_len_at_start(&self, text: &str) -> usize {
        match self.find(text) {
            Some(range) if range.start == 0 => range.end,
            _ => 0,
        }
    }

    /// 正则源码（用于日志/调试）
    pub fn as_str(&self) -> &str {
        match self {
            Matcher::Basic(re) => re.as_str(),
            Matcher::Fancy(re) => re.as_str(),
        }
    }

    pub fn is_fancy(&self) -> bool {
        matches!(self, Matcher::Fancy(_))
    }
}

/// 编译后的单个 schema
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// 为空表示该项只用于规范化（模糊匹配的空名称项）
    pub validator: Option<Validator>,
    pub normalizer: Normalizer,
}

/// 编译后的模式集（不可变快照，配置变化时整体重建）
#[derive(Debug, Clone)]
pub struct CompiledPatternSet {
    /// 所有片段与模板源码，另含 `src_tlds`、`schema_test`、`pretest`
    pub sources: PatternSources,
    pub extra_sources: HashMap<&'static str, String>,
    pub email_fuzzy: Arc<Matcher>,
    pub link_fuzzy: Arc<Matcher>,
    pub link_no_ip_fuzzy: Arc<Matcher>,
    pub host_fuzzy_test: Arc<Matcher>,
    /// 没有任何启用的 schema 时为空
    pub schema_search: Option<Matcher>,
    pub pretest: Matcher,
    /// 小写 schema 名 -> 编译结果；禁用项与无效别名不在表中
    pub schemas: HashMap<String, CompiledSchema>,
    /// 参与前缀扫描的 schema 名（保持配置顺序）
    pub schema_names: Vec<String>,
}

impl CompiledPatternSet {
    /// 按名称取源码
    pub fn source(&self, name: &str) -> Option<&str> {
        if self.sources.contains(name) {
            return Some(self.sources.get(name));
        }
        self.extra_sources.get(name).map(String::as_str)
    }

    /// 按名称（大小写不敏感）取可用 schema
    pub fn schema(&self, name: &str) -> Option<&CompiledSchema> {
        self.schemas.get(&name.to_lowercase())
    }

    /// 可用于前缀校验的 schema（有校验器）
    pub fn validator(&self, name: &str) -> Option<&Validator> {
        self.schema(name).and_then(|s| s.validator.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_prefers_basic_engine() {
        let m = Matcher::compile(r"foo\d+", false, 1000).unwrap();
        assert!(!m.is_fancy());
        assert_eq!(m.find("xx foo12"), Some(3..8));
    }

    #[test]
    fn test_compile_falls_up_to_fancy_for_lookaround() {
        let m = Matcher::compile(r"foo(?!bar)", false, 1000).unwrap();
        assert!(m.is_fancy());
        assert!(!m.is_match("foobar"));
        assert!(m.is_match("foobaz"));
    }

    #[test]
    fn test_compile_basic_rejects_lookaround() {
        assert!(Matcher::compile_basic(r"a(?=b)", false).is_err());
    }

    #[test]
    fn test_case_insensitive_fancy() {
        let m = Matcher::compile_fancy(r"^http(?=:)", true, 1000).unwrap();
        assert_eq!(m.match_len_at_start("HTTP://x"), 4);
    }

    #[test]
    fn test_match_len_at_start_requires_offset_zero() {
        let m = Matcher::compile(r"[a-z]+", false, 1000).unwrap();
        assert_eq!(m.match_len_at_start("abc1"), 3);
        assert_eq!(m.match_len_at_start("1abc"), 0);
    }

    #[test]
    fn test_captures_iter_groups() {
        let m = Matcher::compile(r"(^|\s)(ab)", false, 1000).unwrap();
        let spans: Vec<_> = m.captures_iter("ab ab").collect();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].group_len(1), 0);
        assert_eq!(spans[1].group(2), Some(3..5));
        assert_eq!(spans[1].whole(), 2..5);
    }
}
