//! 统一的 schema 校验器与规范化器
//! 正则对象、正则源码、自定义函数三种校验形式在编译期统一收敛为 `Validator`

use std::fmt;
use std::sync::Arc;

use crate::compiler::pattern::Matcher;
use crate::rule::model::LinkMatch;

/// 自定义校验函数：`(全文, 前缀之后的偏移) -> 匹配长度`，0 表示不匹配
pub type ValidateFn = Arc<dyn Fn(&str, usize) -> usize + Send + Sync>;
/// 自定义规范化函数：原地改写匹配结果的 `text` / `url`
pub type NormalizeFn = Arc<dyn Fn(&mut LinkMatch) + Send + Sync>;

/// 编译后的校验器
#[derive(Clone)]
pub enum Validator {
    /// 锚定在尾部开头的正则（用户正则、`http:`、`mailto:`）
    Anchored(Arc<Matcher>),
    /// `//` 协议相对链接：正则 + 前一个字符不能是 `:` 或 `/`
    ProtocolRelative(Arc<Matcher>),
    /// 自定义函数
    Procedure(ValidateFn),
}

impl Validator {
    /// 在 `pos` 处校验尾部，返回匹配的字节长度
    /// `pos` 越界或不在字符边界上时直接返回 0
    pub fn validate(&self, text: &str, pos: usize) -> usize {
        match self {
            Validator::Anchored(matcher) => match text.get(pos..) {
                Some(tail) => matcher.match_len_at_start(tail),
                None => 0,
            },
            Validator::ProtocolRelative(matcher) => {
                let Some(tail) = text.get(pos..) else {
                    return 0;
                };
                let len = matcher.match_len_at_start(tail);
                if len == 0 {
                    return 0;
                }
                // 排除 `http://` 内部与 `///`
                let before_prefix = pos
                    .checked_sub(2)
                    .and_then(|end| text.get(..end))
                    .and_then(|head| head.chars().next_back());
                if matches!(before_prefix, Some(':') | Some('/')) {
                    return 0;
                }
                len
            }
            Validator::Procedure(func) => func(text, pos),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Anchored(m) => write!(f, "Anchored({})", m.as_str()),
            Validator::ProtocolRelative(m) => write!(f, "ProtocolRelative({})", m.as_str()),
            Validator::Procedure(_) => write!(f, "Procedure(..)"),
        }
    }
}

/// 编译后的规范化器
#[derive(Clone, Default)]
pub enum Normalizer {
    /// 模糊链接补 `http://`，模糊邮箱补 `mailto:`
    #[default]
    Default,
    Custom(NormalizeFn),
}

impl Normalizer {
    pub fn apply(&self, m: &mut LinkMatch) {
        match self {
            Normalizer::Default => default_normalize(m),
            Normalizer::Custom(func) => func(m),
        }
    }
}

impl fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalizer::Default => write!(f, "Default"),
            Normalizer::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// 默认规范化
pub fn default_normalize(m: &mut LinkMatch) {
    if m.schema.is_empty() {
        m.url = format!("http://{}", m.url);
    }

    let has_mailto = m
        .url
        .get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("mailto:"));
    if m.schema == "mailto:" && !has_mailto {
        m.url = format!("mailto:{}", m.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchored(src: &str) -> Arc<Matcher> {
        Arc::new(Matcher::compile(src, true, 10_000).unwrap())
    }

    #[test]
    fn test_anchored_validator_returns_tail_length() {
        let v = Validator::Anchored(anchored(r"^//[a-z]+"));
        assert_eq!(v.validate("my://asdf!", 3), 6);
        assert_eq!(v.validate("my:// asdf", 3), 0);
    }

    #[test]
    fn test_anchored_validator_ignores_later_matches() {
        // 场景：正则未写 ^，但只有尾部开头的匹配才算数
        let v = Validator::Anchored(anchored(r"[a-z]+"));
        assert_eq!(v.validate("x: abc", 2), 0);
        assert_eq!(v.validate("x:abc", 2), 3);
    }

    #[test]
    fn test_validator_out_of_range_or_mid_char() {
        let v = Validator::Anchored(anchored(r"^.+"));
        assert_eq!(v.validate("abc", 10), 0);
        // "я" 占两个字节，偏移 1 不在字符边界
        assert_eq!(v.validate("я", 1), 0);
    }

    #[test]
    fn test_protocol_relative_rejects_after_colon_or_slash() {
        let v = Validator::ProtocolRelative(anchored(r"^[a-z]+\.com"));
        assert_eq!(v.validate("see //abc.com", 6), 7);
        assert_eq!(v.validate("x://abc.com", 4), 0);
        assert_eq!(v.validate("x///abc.com", 4), 0);
        assert_eq!(v.validate("//abc.com", 2), 7);
    }

    #[test]
    fn test_procedure_validator() {
        let v = Validator::Procedure(Arc::new(|text: &str, pos: usize| {
            text[pos..].chars().take_while(|c| c.is_ascii_digit()).count()
        }));
        assert_eq!(v.validate("id:123x", 3), 3);
    }

    #[test]
    fn test_default_normalize() {
        let mut fuzzy = LinkMatch::new("", 0, 11, "example.com");
        default_normalize(&mut fuzzy);
        assert_eq!(fuzzy.url, "http://example.com");

        let mut email = LinkMatch::new("mailto:", 0, 11, "foo@bar.com");
        default_normalize(&mut email);
        assert_eq!(email.url, "mailto:foo@bar.com");

        let mut prefixed = LinkMatch::new("mailto:", 0, 18, "MAILTO:foo@bar.com");
        default_normalize(&mut prefixed);
        assert_eq!(prefixed.url, "MAILTO:foo@bar.com");

        let mut http = LinkMatch::new("http:", 0, 18, "http://example.com");
        Normalizer::Default.apply(&mut http);
        assert_eq!(http.url, "http://example.com");
    }

    #[test]
    fn test_custom_normalizer() {
        let n = Normalizer::Custom(Arc::new(|m: &mut LinkMatch| {
            m.url = m.url.to_uppercase();
        }));
        let mut m = LinkMatch::new("my:", 0, 9, "my://asdf");
        n.apply(&mut m);
        assert_eq!(m.url, "MY://ASDF");
        assert_eq!(m.text, "my://asdf");
    }
}
