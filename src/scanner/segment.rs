//! 分段搜索：模糊模式按空白切段后逐段执行
//! 模糊链接/邮箱主体不含 Z、Cc 字符，最多以一个这类字符作前缀，因此匹配不会跨段；
//! 每段单独调用一次 fancy-regex，回溯步数按段计，长文本不会累计超限
use std::ops::Range;

use crate::compiler::Matcher;

/// 按 Z/Cc 字符切段，除首段外每段以一个分隔字符开头
pub fn segments(text: &str) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut bounds = text
        .char_indices()
        .filter(|&(i, c)| i > 0 && (c.is_whitespace() || c.is_control()))
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()));
    let mut start = 0;
    std::iter::from_fn(move || {
        let end = bounds.next()?;
        let seg = start..end;
        start = end;
        Some(seg)
    })
}

/// 逐段查找最左匹配，返回去掉前缀分组（分组 1）后的区间
///
/// 只在含 `needle` 的段上执行模式；段起点超过 `bound` 后停止，
/// 之后的命中起点必然在 `bound` 右侧
pub fn leftmost_in_segments(
    pattern: &Matcher,
    text: &str,
    needle: char,
    bound: Option<usize>,
) -> Option<Range<usize>> {
    for seg in segments(text) {
        if bound.is_some_and(|b| seg.start > b) {
            break;
        }
        let part = &text[seg.clone()];
        if !part.contains(needle) {
            continue;
        }
        if let Some(caps) = pattern.captures(part) {
            let whole = caps.whole();
            return Some(seg.start + whole.start + caps.group_len(1)..seg.start + whole.end);
        }
    }
    None
}
