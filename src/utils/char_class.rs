//! Unicode 字符类片段库
//! 以正则源码片段的形式提供常用字符类，由模式组装器按名称引用
//! 类别直接使用正则引擎内置的 Unicode 通用类别（\p{..}），不维护码点表

/// 任意码点
pub const SRC_ANY: &str = r"(?s:.)";
/// 控制字符
pub const SRC_CC: &str = r"\p{Cc}";
/// 格式字符
pub const SRC_CF: &str = r"\p{Cf}";
/// 空白分隔符
pub const SRC_Z: &str = r"\p{Z}";
/// 标点
pub const SRC_P: &str = r"\p{P}";

/// 空白 + 标点 + 控制字符
pub const SRC_ZPCC: &str = r"[\p{Z}\p{P}\p{Cc}]";
/// 空白 + 控制字符
pub const SRC_ZCC: &str = r"[\p{Z}\p{Cc}]";
/// 除下划线外的空白/标点/控制字符（仅用于 regex 引擎，依赖字符集交运算）
pub const SRC_ZPCC_NO_UNDERSCORE: &str = r"[\p{Z}\p{P}\p{Cc}&&[^_]]";

/// 可把链接与上下文隔开的字符，链接内完全禁止
pub const TEXT_SEPARATORS: &str = "[><｜]";
/// 同上，去掉方括号后的字符集内容
pub const TEXT_SEPARATOR_CHARS: &str = "><｜";

/// 所有“字母类”字符：排除标点、空白、控制字符和分隔符之外的一切
pub const SRC_PSEUDO_LETTER: &str = r"[^><｜\p{Z}\p{P}\p{Cc}]";

/// 按名称查询字符类片段
pub fn lookup(name: &str) -> Option<&'static str> {
    match name {
        "src_Any" => Some(SRC_ANY),
        "src_Cc" => Some(SRC_CC),
        "src_Cf" => Some(SRC_CF),
        "src_Z" => Some(SRC_Z),
        "src_P" => Some(SRC_P),
        "src_ZPCc" => Some(SRC_ZPCC),
        "src_ZCc" => Some(SRC_ZCC),
        "src_pseudo_letter" => Some(SRC_PSEUDO_LETTER),
        "text_separators" => Some(TEXT_SEPARATORS),
        _ => None,
    }
}

/// 全部字符类名称（组装器写入模式集时使用）
pub const NAMES: [&str; 9] = [
    "src_Any",
    "src_Cc",
    "src_Cf",
    "src_Z",
    "src_P",
    "src_ZPCc",
    "src_ZCc",
    "src_pseudo_letter",
    "text_separators",
];
