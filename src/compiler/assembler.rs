//! 模式组装器
//! 由字符类片段拼装出主机/端口/路径等子模式，以及带 `%TLDS%` 占位符的模糊匹配模板
//! 纯函数：输出只取决于选项

use std::collections::HashMap;
use once_cell::sync::Lazy;

use crate::config::LinkifyOptions;
use crate::utils::char_class::{
    self, SRC_PSEUDO_LETTER, SRC_ZCC, SRC_ZPCC, TEXT_SEPARATORS, TEXT_SEPARATOR_CHARS,
};

/// 顶级域占位符
pub const TLDS_PLACEHOLDER: &str = "%TLDS%";

pub const SRC_IP4: &str = r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

// user:pass 中禁止 @/[]() 以免截错主机
pub const SRC_AUTH: &str = r"(?:[^\p{Z}\p{Cc}@/\[\]()]+@)?";

pub const SRC_PORT: &str = r"(?::(?:6(?:[0-4]\d{3}|5(?:[0-4]\d{2}|5(?:[0-2]\d|3[0-5])))|[1-5]?\d{1,4}))?";

// 首字符禁止引号：引号包裹的邮箱更常见
pub const SRC_EMAIL_NAME: &str = r#"[\-:&=\+\$,\.a-zA-Z0-9_][\-:&=\+\$,"\.a-zA-Z0-9_]*"#;

pub const SRC_XN: &str = r"xn--[a-z0-9\-]{1,59}";

/// 允许纯字母数字的根域（http://test1）
static SRC_DOMAIN_ROOT: Lazy<String> =
    Lazy::new(|| format!("(?:{}|{}{{1,63}})", SRC_XN, SRC_PSEUDO_LETTER));

static SRC_DOMAIN: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:{xn}|(?:{pl})|(?:{pl}(?:-|{pl}){{0,61}}{pl}))",
        xn = SRC_XN,
        pl = SRC_PSEUDO_LETTER
    )
});

// 数字已包含在普通域名字符里，不需要单独的 IP 分支
static SRC_HOST: Lazy<String> =
    Lazy::new(|| format!("(?:(?:(?:{d})\\.)*{d})", d = SRC_DOMAIN.as_str()));

static TPL_HOST_FUZZY: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:{}|(?:(?:(?:{})\\.)+(?:{})))",
        SRC_IP4,
        SRC_DOMAIN.as_str(),
        TLDS_PLACEHOLDER
    )
});

static TPL_HOST_NO_IP_FUZZY: Lazy<String> = Lazy::new(|| {
    format!(
        "(?:(?:(?:{})\\.)+(?:{}))",
        SRC_DOMAIN.as_str(),
        TLDS_PLACEHOLDER
    )
});

/// 粗筛模糊主机，仅用于快速否定
static TPL_HOST_FUZZY_TEST: Lazy<String> = Lazy::new(|| {
    format!(
        r"localhost|www\.|\.\d{{1,3}}\.|(?:\.(?:{})(?:{}|>|$))",
        TLDS_PLACEHOLDER, SRC_ZPCC
    )
});

/// 主机结束符：后面必须是文本结尾/分隔符/标点空白，且不能是 `-`、`_`、`:数字`、`.-`
fn host_terminator(opts: &LinkifyOptions) -> String {
    format!(
        "(?=$|{sep}|{zpcc})(?!{dash}_|:\\d|\\.-|\\.(?!$|{zpcc}))",
        sep = TEXT_SEPARATORS,
        zpcc = SRC_ZPCC,
        dash = if opts.triple_dash { "-(?!--)|" } else { "-|" },
    )
}

fn src_path(opts: &LinkifyOptions) -> String {
    let zcc_body = r"\p{Z}\p{Cc}";
    let parts = [
        // 普通字符
        format!(r#"[^{zcc_body}{TEXT_SEPARATOR_CHARS}()\[\]{{}}.,"'?!\-;]"#),
        // 成对括号/引号内的内容
        format!(r"\[[^{zcc_body}\]]*\]"),
        format!(r"\([^{zcc_body})]*\)"),
        format!(r"\{{[^{zcc_body}}}]*\}}"),
        format!(r#""[^{zcc_body}"]+""#),
        format!(r"'[^{zcc_body}']+'"),
        format!(r"'(?={SRC_PSEUDO_LETTER}|-)"),
        // google 搜索、github 提交区间、REST 路径中的连续点
        r"\.{2,}[a-zA-Z0-9%/&]".to_string(),
        format!(r"\.(?![{zcc_body}.]|$)"),
        if opts.triple_dash {
            r"-(?!--(?:[^-]|$))(?:-*)".to_string()
        } else {
            r"-+".to_string()
        },
        format!(r",(?!{SRC_ZCC}|$)"),
        format!(r";(?!{SRC_ZCC}|$)"),
        // 允许路径中出现 `!!!`，但不能在结尾
        format!(r"!+(?![{zcc_body}!]|$)"),
        format!(r"\?(?![{zcc_body}?]|$)"),
    ];
    format!("(?:[/?#](?:{})+|/)?", parts.join("|"))
}

/// 模糊链接前缀：不能紧跟在 `.:/-_@` 之后，但允许 `>`（markdown 引用）
const LINK_FUZZY_PREFIX_DENY: &str = r"(?![.:/\-_@])";
const LINK_FUZZY_PREFIX_CHARS: &str = "[$+<=>^`|｜]";

/// 组装结果：模式名 -> 正则源码
#[derive(Debug, Clone, Default)]
pub struct PatternSources {
    sources: HashMap<&'static str, String>,
}

impl PatternSources {
    fn insert(&mut self, name: &'static str, src: impl Into<String>) {
        self.sources.insert(name, src.into());
    }

    /// 按名称取源码，未知名称返回空串
    pub fn get(&self, name: &str) -> &str {
        self.sources.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.sources.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// 模式组装器
pub struct PatternAssembler;

impl PatternAssembler {
    /// 按选项组装所有片段与模板
    pub fn assemble(opts: &LinkifyOptions) -> PatternSources {
        let mut re = PatternSources::default();

        // 1. 字符类片段
        for name in char_class::NAMES {
            if let Some(src) = char_class::lookup(name) {
                re.insert(name, src);
            }
        }

        // 2. 基础子模式
        let terminator = host_terminator(opts);
        let path = src_path(opts);

        re.insert("src_ip4", SRC_IP4);
        re.insert("src_auth", SRC_AUTH);
        re.insert("src_port", SRC_PORT);
        re.insert("src_email_name", SRC_EMAIL_NAME);
        re.insert("src_xn", SRC_XN);
        re.insert("src_domain_root", SRC_DOMAIN_ROOT.as_str());
        re.insert("src_domain", SRC_DOMAIN.as_str());
        re.insert("src_host", SRC_HOST.as_str());
        re.insert("src_host_terminator", terminator.as_str());
        re.insert("src_path", path.as_str());

        // 3. 严格主机组合
        re.insert("src_host_strict", format!("{}{}", SRC_HOST.as_str(), terminator));
        re.insert(
            "src_host_port_strict",
            format!("{}{}{}", SRC_HOST.as_str(), SRC_PORT, terminator),
        );

        // 4. 模糊主机模板
        let tpl_host_fuzzy_strict = format!("{}{}", TPL_HOST_FUZZY.as_str(), terminator);
        let tpl_host_port_fuzzy_strict =
            format!("{}{}{}", TPL_HOST_FUZZY.as_str(), SRC_PORT, terminator);
        let tpl_host_port_no_ip_fuzzy_strict =
            format!("{}{}{}", TPL_HOST_NO_IP_FUZZY.as_str(), SRC_PORT, terminator);

        re.insert("tpl_host_fuzzy", TPL_HOST_FUZZY.as_str());
        re.insert("tpl_host_no_ip_fuzzy", TPL_HOST_NO_IP_FUZZY.as_str());
        re.insert("tpl_host_fuzzy_test", TPL_HOST_FUZZY_TEST.as_str());

        // 5. 主模板
        re.insert(
            "tpl_email_fuzzy",
            format!(
                r#"(^|{}|"|\(|{})({}@{})"#,
                TEXT_SEPARATORS, SRC_ZCC, SRC_EMAIL_NAME, tpl_host_fuzzy_strict
            ),
        );
        re.insert(
            "tpl_link_fuzzy",
            Self::link_template(&tpl_host_port_fuzzy_strict, &path),
        );
        re.insert(
            "tpl_link_no_ip_fuzzy",
            Self::link_template(&tpl_host_port_no_ip_fuzzy_strict, &path),
        );

        re.insert("tpl_host_fuzzy_strict", tpl_host_fuzzy_strict);
        re.insert("tpl_host_port_fuzzy_strict", tpl_host_port_fuzzy_strict);
        re.insert("tpl_host_port_no_ip_fuzzy_strict", tpl_host_port_no_ip_fuzzy_strict);

        re
    }

    fn link_template(host_port: &str, path: &str) -> String {
        format!(
            "(^|{deny}(?:{chars}|{zpcc}))((?!{chars}){host_port}{path})",
            deny = LINK_FUZZY_PREFIX_DENY,
            chars = LINK_FUZZY_PREFIX_CHARS,
            zpcc = SRC_ZPCC,
        )
    }
}
