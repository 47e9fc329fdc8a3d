//! 模式编译器核心
//! 把 schema 表 + 选项 + 顶级域列表编译为一份完整的模式集快照
//! 模板之间共享顶级域交替式，因此任何输入变化都整体重建，不做增量修补

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::assembler::{PatternAssembler, PatternSources, TLDS_PLACEHOLDER};
use super::pattern::{CompiledPatternSet, CompiledSchema, Matcher};
use crate::config::LinkifyOptions;
use crate::error::{LinkifyError, LinkifyResult};
use crate::rule::schema::{BuiltinRule, PatternRule, SchemaDef, SchemaTable};
use crate::rule::validator::{Normalizer, Validator};
use crate::utils::char_class::{SRC_ZPCC_NO_UNDERSCORE, TEXT_SEPARATORS};
use crate::utils::tlds::TldList;

/// 内置 schema 的校验模式（与顶级域无关，但依赖选项）
struct BuiltinMatchers {
    http: Arc<Matcher>,
    not_http: Arc<Matcher>,
    mailto: Arc<Matcher>,
}

impl BuiltinMatchers {
    fn build(re: &PatternSources, extra: &mut HashMap<&'static str, String>, limit: usize) -> LinkifyResult<Self> {
        let http_src = format!(
            "^//{}{}{}",
            re.get("src_auth"),
            re.get("src_host_port_strict"),
            re.get("src_path")
        );
        // 不允许单级域名，避免把代码注释里的 `//test` 当成链接
        let not_http_src = format!(
            r"^{}(?:localhost|(?:(?:{})\.)+{}){}{}{}",
            re.get("src_auth"),
            re.get("src_domain"),
            re.get("src_domain_root"),
            re.get("src_port"),
            re.get("src_host_terminator"),
            re.get("src_path")
        );
        let mailto_src = format!("^{}@{}", re.get("src_email_name"), re.get("src_host_strict"));

        let matchers = Self {
            http: Arc::new(Matcher::compile(&http_src, true, limit)?),
            not_http: Arc::new(Matcher::compile(&not_http_src, true, limit)?),
            mailto: Arc::new(Matcher::compile(&mailto_src, true, limit)?),
        };

        extra.insert("http", http_src);
        extra.insert("not_http", not_http_src);
        extra.insert("mailto", mailto_src);
        Ok(matchers)
    }

    fn validator(&self, rule: BuiltinRule) -> Validator {
        match rule {
            BuiltinRule::Http => Validator::Anchored(self.http.clone()),
            BuiltinRule::ProtocolRelative => Validator::ProtocolRelative(self.not_http.clone()),
            BuiltinRule::Mailto => Validator::Anchored(self.mailto.clone()),
        }
    }
}

/// 模式编译器
pub struct PatternCompiler;

impl PatternCompiler {
    /// 编译完整模式集
    pub fn compile(
        schemas: &SchemaTable,
        opts: &LinkifyOptions,
        tlds: &TldList,
    ) -> LinkifyResult<CompiledPatternSet> {
        let start = Instant::now();
        let limit = opts.backtrack_limit;

        // 1. 按选项重新组装基础片段
        let re = PatternAssembler::assemble(opts);
        let mut extra: HashMap<&'static str, String> = HashMap::new();

        // 2. 顶级域交替式
        let src_tlds = tlds.alternation(re.get("src_xn"));
        let untpl = |name: &str| re.get(name).replace(TLDS_PLACEHOLDER, &src_tlds);

        // 3. 代入模板并编译（大小写不敏感）
        let email_fuzzy_src = untpl("tpl_email_fuzzy");
        let link_fuzzy_src = untpl("tpl_link_fuzzy");
        let link_no_ip_fuzzy_src = untpl("tpl_link_no_ip_fuzzy");
        let host_fuzzy_test_src = untpl("tpl_host_fuzzy_test");

        let email_fuzzy = Arc::new(Matcher::compile(&email_fuzzy_src, true, limit)?);
        let link_fuzzy = Arc::new(Matcher::compile(&link_fuzzy_src, true, limit)?);
        let link_no_ip_fuzzy = Arc::new(Matcher::compile(&link_no_ip_fuzzy_src, true, limit)?);
        let host_fuzzy_test = Arc::new(Matcher::compile_basic(&host_fuzzy_test_src, true)?);

        // 4. 编译各 schema，随后解析别名
        let builtins = BuiltinMatchers::build(&re, &mut extra, limit)?;
        let mut compiled = Self::compile_schemas(schemas, &builtins, limit)?;

        // 5. 模糊匹配使用的空名称项：只有规范化器
        compiled.insert(
            String::new(),
            CompiledSchema {
                validator: None,
                normalizer: Normalizer::Default,
            },
        );

        // 6. schema 前缀交替式：前面必须是文本开头或非下划线的分隔/标点/空白
        let schema_names: Vec<String> = schemas
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
            .filter(|name| compiled.get(*name).is_some_and(|s| s.validator.is_some()))
            .map(str::to_string)
            .collect();

        let slist = schema_names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let schema_test_src = format!(
            "(^|{}|{})({})",
            TEXT_SEPARATORS, SRC_ZPCC_NO_UNDERSCORE, slist
        );
        let schema_search = if schema_names.is_empty() {
            None
        } else {
            Some(Matcher::compile_basic(&schema_test_src, true)?)
        };

        // 7. 组合预检：schema 前缀 / 模糊主机提示 / `@`
        let pretest_src = if schema_names.is_empty() {
            format!("({})|@", host_fuzzy_test_src)
        } else {
            format!("({})|({})|@", schema_test_src, host_fuzzy_test_src)
        };
        let pretest = Matcher::compile_basic(&pretest_src, true)?;

        debug!("✅ 链接模式编译完成，总耗时{:?}", start.elapsed());
        debug!(
            "📊 编译统计：schema {}个（参与前缀扫描{}个）、顶级域{}个、替换默认列表={}",
            compiled.len() - 1,
            schema_names.len(),
            tlds.as_slice().len(),
            tlds.is_replaced()
        );

        extra.insert("src_tlds", src_tlds);
        extra.insert("email_fuzzy", email_fuzzy_src);
        extra.insert("link_fuzzy", link_fuzzy_src);
        extra.insert("link_no_ip_fuzzy", link_no_ip_fuzzy_src);
        extra.insert("host_fuzzy_test", host_fuzzy_test_src);
        extra.insert("schema_test", schema_test_src);
        extra.insert("pretest", pretest_src);

        Ok(CompiledPatternSet {
            sources: re,
            extra_sources: extra,
            email_fuzzy,
            link_fuzzy,
            link_no_ip_fuzzy,
            host_fuzzy_test,
            schema_search,
            pretest,
            schemas: compiled,
            schema_names,
        })
    }

    /// 两遍编译：先编译直接规则，再让别名复制目标的校验器/规范化器
    fn compile_schemas(
        table: &SchemaTable,
        builtins: &BuiltinMatchers,
        limit: usize,
    ) -> LinkifyResult<HashMap<String, CompiledSchema>> {
        let mut compiled = HashMap::new();
        let mut aliases = Vec::new();

        for (name, def) in table.iter() {
            match def {
                // 跳过禁用项
                SchemaDef::Disabled => continue,
                SchemaDef::Alias(target) => aliases.push((name, target.to_lowercase())),
                SchemaDef::Rule(rule) => {
                    let validator = Self::compile_validator(name, &rule.validate, builtins, limit)?;
                    let normalizer = rule
                        .normalize
                        .clone()
                        .map(Normalizer::Custom)
                        .unwrap_or_default();
                    compiled.insert(
                        name.to_string(),
                        CompiledSchema {
                            validator: Some(validator),
                            normalizer,
                        },
                    );
                }
            }
        }

        // 别名指向禁用/未知/另一个别名时不生成规则
        let resolved: Vec<(String, CompiledSchema)> = aliases
            .into_iter()
            .filter_map(|(name, target)| {
                compiled
                    .get(&target)
                    .map(|schema| (name.to_string(), schema.clone()))
            })
            .collect();
        compiled.extend(resolved);

        Ok(compiled)
    }

    /// 把各种校验形式统一成 `Validator`
    fn compile_validator(
        name: &str,
        rule: &PatternRule,
        builtins: &BuiltinMatchers,
        limit: usize,
    ) -> LinkifyResult<Validator> {
        match rule {
            PatternRule::Compiled(re) => Ok(Validator::Anchored(Arc::new(Matcher::Fancy(re.clone())))),
            PatternRule::Source(src) => Matcher::compile(src, false, limit)
                .map(|m| Validator::Anchored(Arc::new(m)))
                .map_err(|_| LinkifyError::schema(name, src)),
            PatternRule::Procedure(func) => Ok(Validator::Procedure(func.clone())),
            PatternRule::Builtin(rule) => Ok(builtins.validator(*rule)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::schema::SchemaRule;

    fn compile_default() -> CompiledPatternSet {
        PatternCompiler::compile(
            &SchemaTable::builtin(),
            &LinkifyOptions::default(),
            &TldList::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_compile_builtin_schemas() {
        let set = compile_default();
        assert_eq!(set.schema_names, vec!["http:", "https:", "ftp:", "//", "mailto:"]);
        assert!(set.schema("").is_some());
        assert!(set.schema("").unwrap().validator.is_none());
        assert!(set.validator("HTTPS:").is_some());
    }

    #[test]
    fn test_templates_have_tlds_substituted() {
        let set = compile_default();
        for name in ["email_fuzzy", "link_fuzzy", "link_no_ip_fuzzy", "host_fuzzy_test"] {
            let src = set.source(name).unwrap();
            assert!(!src.contains(TLDS_PLACEHOLDER), "{} not substituted", name);
            assert!(src.contains("museum"));
        }
        assert!(set.source("src_tlds").unwrap().contains("xn--"));
    }

    #[test]
    fn test_pretest_and_schema_search_stay_linear() {
        let set = compile_default();
        assert!(!set.pretest.is_fancy());
        assert!(!set.schema_search.as_ref().unwrap().is_fancy());
        assert!(!set.host_fuzzy_test.is_fancy());
    }

    #[test]
    fn test_alias_to_disabled_or_unknown_yields_no_rule() {
        let mut table = SchemaTable::builtin();
        table.insert("http:", SchemaDef::Disabled);
        table.insert("web+x:", SchemaDef::alias("nope:"));
        let set = PatternCompiler::compile(&table, &LinkifyOptions::default(), &TldList::default()).unwrap();
        assert!(set.schema("https:").is_none());
        assert!(set.schema("ftp:").is_none());
        assert!(set.schema("web+x:").is_none());
        assert_eq!(set.schema_names, vec!["//", "mailto:"]);
    }

    #[test]
    fn test_bad_regex_source_is_schema_error() {
        let mut table = SchemaTable::builtin();
        table.insert("bad:", SchemaDef::source("(unclosed"));
        let err = PatternCompiler::compile(&table, &LinkifyOptions::default(), &TldList::default())
            .unwrap_err();
        match err {
            LinkifyError::Schema { name, value } => {
                assert_eq!(name, "bad:");
                assert_eq!(value, "(unclosed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_enabled_schema_skips_schema_search() {
        let table: SchemaTable = vec![("http:", SchemaDef::Disabled)].into_iter().collect();
        let set = PatternCompiler::compile(&table, &LinkifyOptions::default(), &TldList::default()).unwrap();
        assert!(set.schema_search.is_none());
        assert!(set.pretest.is_match("foo@bar"));
    }

    #[test]
    fn test_schema_names_are_escaped() {
        let mut table = SchemaTable::builtin();
        table.insert("foo+bar:", SchemaRule::from_source("^x").into());
        let set = PatternCompiler::compile(&table, &LinkifyOptions::default(), &TldList::default()).unwrap();
        assert!(set.source("schema_test").unwrap().contains(r"foo\+bar:"));
    }
}
