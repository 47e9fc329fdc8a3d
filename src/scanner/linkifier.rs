//! 链接识别器核心：持有配置与编译快照，执行扫描
use std::sync::Arc;

use tracing::{trace, warn};

use super::cache::{ScanCache, ScanHit};
use super::segment::leftmost_in_segments;
use crate::compiler::{CompiledPatternSet, PatternCompiler};
use crate::config::{LinkifyOptions, PartialOptions};
use crate::error::LinkifyResult;
use crate::rule::model::LinkMatch;
use crate::rule::schema::{SchemaDef, SchemaTable};
use crate::utils::tlds::TldList;

/// 链接识别器
///
/// 配置（schema 表、选项、顶级域）任何变化都会整体重编译模式集；
/// 编译失败时保留原配置与原快照。克隆共享同一份编译快照，缓存各自独立。
#[derive(Debug, Clone)]
pub struct Linkifier {
    schemas: SchemaTable,
    options: LinkifyOptions,
    tlds: TldList,
    compiled: Arc<CompiledPatternSet>,
    cache: ScanCache,
}

impl Linkifier {
    /// 默认 schema + 默认选项
    pub fn new() -> LinkifyResult<Self> {
        Self::builder().build()
    }

    /// 在内置 schema 基础上叠加自定义 schema（同名覆盖），并使用指定选项
    pub fn with_config(schemas: SchemaTable, options: LinkifyOptions) -> LinkifyResult<Self> {
        Self::builder().schemas(schemas).options(options).build()
    }

    pub fn builder() -> LinkifierBuilder {
        LinkifierBuilder::new()
    }

    /// 编译到临时快照，成功后一次性提交
    fn install(&mut self, schemas: SchemaTable, options: LinkifyOptions, tlds: TldList) -> LinkifyResult<()> {
        let compiled = PatternCompiler::compile(&schemas, &options, &tlds)?;
        self.schemas = schemas;
        self.options = options;
        self.tlds = tlds;
        self.compiled = Arc::new(compiled);
        self.cache.reset();
        Ok(())
    }

    /// 新增或覆盖 schema；`SchemaDef::Disabled` 用于关闭已有 schema
    pub fn add(&mut self, name: &str, def: impl Into<SchemaDef>) -> LinkifyResult<&mut Self> {
        let mut schemas = self.schemas.clone();
        schemas.insert(name, def.into());
        self.install(schemas, self.options, self.tlds.clone())?;
        Ok(self)
    }

    /// 部分更新选项
    pub fn set(&mut self, patch: PartialOptions) -> LinkifyResult<&mut Self> {
        let mut options = self.options;
        options.apply(&patch);
        self.install(self.schemas.clone(), options, self.tlds.clone())?;
        Ok(self)
    }

    /// 替换（`keep_old = false`）或合并顶级域列表
    /// 替换后两字母国家域不再通配，需要在列表中显式给出
    pub fn tlds<S: AsRef<str>>(&mut self, list: &[S], keep_old: bool) -> LinkifyResult<&mut Self> {
        let mut tlds = self.tlds.clone();
        if keep_old {
            tlds.merge(list);
        } else {
            tlds.replace(list);
        }
        self.install(self.schemas.clone(), self.options, tlds)?;
        Ok(self)
    }

    /// 快速预检：返回 false 时一定不存在链接，返回 true 时可能存在
    pub fn pretest(&self, text: &str) -> bool {
        self.compiled.pretest.is_match(text)
    }

    /// 查找最佳（最左、其次最长）的一个链接，结果写入缓存
    pub fn test(&mut self, text: &str) -> bool {
        self.cache.reset();
        match Self::scan(&self.compiled, &self.options, text) {
            Some(hit) => {
                self.cache.store(text, hit);
                true
            }
            None => false,
        }
    }

    /// 文本是否以带 schema 前缀的链接开头（不允许前导字符，模糊链接不算）
    pub fn match_at_start(&mut self, text: &str) -> bool {
        self.cache.reset();
        let Some(search) = self.compiled.schema_search.as_ref() else {
            return false;
        };
        let Some(caps) = search.captures(text) else {
            return false;
        };
        let whole = caps.whole();
        if whole.start != 0 || caps.group_len(1) != 0 {
            return false;
        }
        let Some(name) = caps.group(2).map(|r| text[r].to_lowercase()) else {
            return false;
        };
        let Some(validator) = self.compiled.validator(&name) else {
            return false;
        };
        let len = validator.validate(text, whole.end);
        if len == 0 || !Self::is_valid_end(text, whole.end + len) {
            return false;
        }
        self.cache.store(text, ScanHit::new(name, 0, whole.end + len));
        true
    }

    /// 直接在 `pos` 处调用指定 schema 的校验器，返回匹配长度
    /// 未知或已禁用的 schema 返回 0
    pub fn test_schema_at(&self, text: &str, name: &str, pos: usize) -> usize {
        self.compiled
            .validator(name)
            .map(|v| v.validate(text, pos))
            .unwrap_or(0)
    }

    /// 提取全部链接，没有时返回 None
    /// 紧跟在对同一文本的 `test` 之后调用时，复用缓存中的第一个结果
    pub fn matches(&mut self, text: &str) -> Option<Vec<LinkMatch>> {
        let compiled = Arc::clone(&self.compiled);
        let mut result = Vec::new();
        let mut shift = 0;

        // 1. 复用缓存
        if let Some(hit) = self.cache.hit(text).cloned() {
            result.push(Self::create_match(&compiled, text, &hit, 0));
            shift = hit.last_index;
        }
        self.cache.reset();

        // 2. 逐段扫描剩余文本，偏移换算回原文
        while let Some(hit) = Self::scan(&compiled, &self.options, &text[shift..]) {
            result.push(Self::create_match(&compiled, &text[shift..], &hit, shift));
            shift += hit.last_index;
        }

        if result.is_empty() { None } else { Some(result) }
    }

    /// 按名称查询片段/模板/编译后模式的源码，可用于构造自定义校验器
    pub fn source(&self, name: &str) -> Option<&str> {
        self.compiled.source(name)
    }

    pub fn options(&self) -> &LinkifyOptions {
        &self.options
    }

    pub fn schemas(&self) -> &SchemaTable {
        &self.schemas
    }

    pub fn tld_list(&self) -> &TldList {
        &self.tlds
    }

    /// 单次扫描，不读写缓存
    fn scan(compiled: &CompiledPatternSet, opts: &LinkifyOptions, text: &str) -> Option<ScanHit> {
        if text.is_empty() {
            return None;
        }
        let mut best: Option<ScanHit> = None;

        // 1. schema 前缀：从左到右，第一个校验通过的即为 schema 候选
        if let Some(search) = compiled.schema_search.as_ref() {
            for caps in search.captures_iter(text) {
                let whole = caps.whole();
                let Some(name) = caps.group(2).map(|r| text[r].to_lowercase()) else {
                    continue;
                };
                let Some(validator) = compiled.validator(&name) else {
                    continue;
                };
                let len = validator.validate(text, whole.end);
                if len == 0 {
                    continue;
                }
                if !Self::is_valid_end(text, whole.end + len) {
                    warn!("schema '{}' 校验器返回非法长度{}（位置{}），已忽略", name, len, whole.end);
                    continue;
                }
                best = Some(ScanHit::new(name, whole.start + caps.group_len(1), whole.end + len));
                break;
            }
        }

        // 2. 模糊链接：顶级域提示位于当前最佳之前才需要完整匹配
        if opts.fuzzy_link && compiled.validator("http:").is_some() {
            let hint = compiled.host_fuzzy_test.find(text).map(|r| r.start);
            if let Some(tld_pos) = hint {
                if best.as_ref().is_none_or(|b| tld_pos <= b.index) {
                    let pattern = if opts.fuzzy_ip {
                        &compiled.link_fuzzy
                    } else {
                        &compiled.link_no_ip_fuzzy
                    };
                    let bound = best.as_ref().map(|b| b.index);
                    if let Some(range) = leftmost_in_segments(pattern, text, '.', bound) {
                        let candidate = ScanHit::new("", range.start, range.end);
                        if candidate.outranks(best.as_ref()) {
                            best = Some(candidate);
                        }
                    }
                }
            }
        }

        // 3. 模糊邮箱（192.168.1.1@gmail.com 这类情况无法靠提示跳过）
        if opts.fuzzy_email && compiled.validator("mailto:").is_some() && text.contains('@') {
            let bound = best.as_ref().map(|b| b.index);
            if let Some(range) = leftmost_in_segments(&compiled.email_fuzzy, text, '@', bound) {
                let candidate = ScanHit::new("mailto:", range.start, range.end);
                if candidate.outranks(best.as_ref()) {
                    best = Some(candidate);
                }
            }
        }

        if let Some(hit) = best.as_ref() {
            trace!(
                "命中链接：schema='{}' 区间{}..{}",
                hit.schema, hit.index, hit.last_index
            );
        }
        best
    }

    // 自定义校验器可能返回越界或落在字符中间的长度
    fn is_valid_end(text: &str, end: usize) -> bool {
        end <= text.len() && text.is_char_boundary(end)
    }

    fn create_match(compiled: &CompiledPatternSet, text: &str, hit: &ScanHit, shift: usize) -> LinkMatch {
        let mut m = LinkMatch::new(
            &hit.schema,
            hit.index + shift,
            hit.last_index + shift,
            &text[hit.index..hit.last_index],
        );
        if let Some(schema) = compiled.schema(&hit.schema) {
            schema.normalizer.apply(&mut m);
        }
        m
    }
}

/// 识别器构建器（一次性设置 schema / 选项 / 顶级域）
#[derive(Debug, Clone)]
pub struct LinkifierBuilder {
    schemas: SchemaTable,
    options: LinkifyOptions,
    tlds: TldList,
}

impl LinkifierBuilder {
    pub fn new() -> Self {
        Self {
            schemas: SchemaTable::builtin(),
            options: LinkifyOptions::default(),
            tlds: TldList::default(),
        }
    }

    /// 追加/覆盖单个 schema
    pub fn schema(mut self, name: &str, def: impl Into<SchemaDef>) -> Self {
        self.schemas.insert(name, def.into());
        self
    }

    /// 按顺序叠加整张 schema 表
    pub fn schemas(mut self, table: SchemaTable) -> Self {
        for (name, def) in table.iter() {
            self.schemas.insert(name, def.clone());
        }
        self
    }

    pub fn options(mut self, options: LinkifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tlds<S: AsRef<str>>(mut self, list: &[S], keep_old: bool) -> Self {
        if keep_old {
            self.tlds.merge(list);
        } else {
            self.tlds.replace(list);
        }
        self
    }

    pub fn build(self) -> LinkifyResult<Linkifier> {
        let compiled = PatternCompiler::compile(&self.schemas, &self.options, &self.tlds)?;
        Ok(Linkifier {
            schemas: self.schemas,
            options: self.options,
            tlds: self.tlds,
            compiled: Arc::new(compiled),
            cache: ScanCache::default(),
        })
    }
}

impl Default for LinkifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
