//! Schema 表：链接前缀 -> 规则 / 别名 / 禁用
//! 表本身只存放用户定义，编译由 `PatternCompiler` 完成

use std::fmt;
use std::sync::Arc;

use fancy_regex::Regex as FancyRegex;
use serde_json::Value;

use crate::error::{LinkifyError, LinkifyResult};
use crate::rule::model::LinkMatch;
use crate::rule::validator::{NormalizeFn, ValidateFn};

/// 内置校验规则，依赖组装器产出的主机/路径模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinRule {
    /// `http:` 家族：`//` + 严格主机/端口 + 路径
    Http,
    /// `//` 协议相对链接：拒绝单级主机
    ProtocolRelative,
    /// `mailto:`：本地部分 + `@` + 严格主机
    Mailto,
}

/// 校验规则的四种来源
#[derive(Clone)]
pub enum PatternRule {
    /// 已编译的正则
    Compiled(FancyRegex),
    /// 正则源码，编译期编译，失败即 schema 配置错误
    Source(String),
    /// 自定义函数
    Procedure(ValidateFn),
    Builtin(BuiltinRule),
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternRule::Compiled(re) => write!(f, "Compiled({})", re.as_str()),
            PatternRule::Source(src) => write!(f, "Source({})", src),
            PatternRule::Procedure(_) => write!(f, "Procedure(..)"),
            PatternRule::Builtin(rule) => write!(f, "Builtin({:?})", rule),
        }
    }
}

/// 单条 schema 规则：校验 + 可选规范化（缺省使用默认规范化）
#[derive(Clone)]
pub struct SchemaRule {
    pub validate: PatternRule,
    pub normalize: Option<NormalizeFn>,
}

impl fmt::Debug for SchemaRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRule")
            .field("validate", &self.validate)
            .field("normalize", &self.normalize.as_ref().map(|_| ".."))
            .finish()
    }
}

impl SchemaRule {
    pub fn new(validate: PatternRule) -> Self {
        Self {
            validate,
            normalize: None,
        }
    }

    /// 由正则源码创建
    pub fn from_source(src: impl Into<String>) -> Self {
        Self::new(PatternRule::Source(src.into()))
    }

    /// 由已编译正则创建
    pub fn from_regex(re: FancyRegex) -> Self {
        Self::new(PatternRule::Compiled(re))
    }

    /// 由自定义函数创建
    pub fn from_fn<F>(func: F) -> Self
    where
        F: Fn(&str, usize) -> usize + Send + Sync + 'static,
    {
        Self::new(PatternRule::Procedure(Arc::new(func)))
    }

    /// 设置自定义规范化函数
    pub fn with_normalize<F>(mut self, func: F) -> Self
    where
        F: Fn(&mut LinkMatch) + Send + Sync + 'static,
    {
        self.normalize = Some(Arc::new(func));
        self
    }
}

/// schema 表中的一项定义
#[derive(Clone, Debug)]
pub enum SchemaDef {
    Rule(SchemaRule),
    /// 指向另一个 schema 名的别名，编译期解析
    Alias(String),
    /// 禁用（可用于关闭内置 schema）
    Disabled,
}

impl SchemaDef {
    pub fn alias(target: impl Into<String>) -> Self {
        SchemaDef::Alias(target.into())
    }

    pub fn source(src: impl Into<String>) -> Self {
        SchemaDef::Rule(SchemaRule::from_source(src))
    }

    /// 从 JSON 解析定义
    /// - 字符串：别名
    /// - null：禁用
    /// - 对象：`validate` 必须是正则源码字符串，`normalize` 只能为 null 或缺省
    pub fn from_json(name: &str, value: &Value) -> LinkifyResult<Self> {
        match value {
            Value::String(target) => Ok(SchemaDef::Alias(target.clone())),
            Value::Null => Ok(SchemaDef::Disabled),
            Value::Object(obj) => {
                let Some(Value::String(src)) = obj.get("validate") else {
                    return Err(LinkifyError::schema(name, value));
                };
                match obj.get("normalize") {
                    None | Some(Value::Null) => Ok(SchemaDef::source(src.clone())),
                    Some(_) => Err(LinkifyError::schema(name, value)),
                }
            }
            _ => Err(LinkifyError::schema(name, value)),
        }
    }
}

impl From<SchemaRule> for SchemaDef {
    fn from(rule: SchemaRule) -> Self {
        SchemaDef::Rule(rule)
    }
}

/// 有序 schema 表，顺序决定前缀交替式中的优先级
#[derive(Clone, Debug, Default)]
pub struct SchemaTable {
    entries: Vec<(String, SchemaDef)>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置 schema：`http:`、`https:`、`ftp:`、`//`、`mailto:`
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("http:", SchemaDef::Rule(SchemaRule::new(PatternRule::Builtin(BuiltinRule::Http))));
        table.insert("https:", SchemaDef::alias("http:"));
        table.insert("ftp:", SchemaDef::alias("http:"));
        table.insert(
            "//",
            SchemaDef::Rule(SchemaRule::new(PatternRule::Builtin(BuiltinRule::ProtocolRelative))),
        );
        table.insert("mailto:", SchemaDef::Rule(SchemaRule::new(PatternRule::Builtin(BuiltinRule::Mailto))));
        table
    }

    /// 插入或覆盖；名称统一转小写，覆盖时保留原位置
    pub fn insert(&mut self, name: &str, def: SchemaDef) {
        let key = name.to_lowercase();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = def,
            None => self.entries.push((key, def)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDef> {
        let key = name.to_lowercase();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SchemaDef)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 从 JSON 对象解析整张表（键顺序即优先级）
    pub fn from_json(value: &Value) -> LinkifyResult<Self> {
        let Value::Object(obj) = value else {
            return Err(LinkifyError::InvalidInput(format!(
                "schemas must be a JSON object, got {}",
                value
            )));
        };
        let mut table = Self::new();
        for (name, def) in obj {
            table.insert(name, SchemaDef::from_json(name, def)?);
        }
        Ok(table)
    }
}

impl<S: AsRef<str>> FromIterator<(S, SchemaDef)> for SchemaTable {
    fn from_iter<I: IntoIterator<Item = (S, SchemaDef)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, def) in iter {
            table.insert(name.as_ref(), def);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_order_and_aliases() {
        let table = SchemaTable::builtin();
        let names: Vec<_> = table.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["http:", "https:", "ftp:", "//", "mailto:"]);
        assert!(matches!(table.get("HTTPS:"), Some(SchemaDef::Alias(t)) if t == "http:"));
    }

    #[test]
    fn test_insert_overrides_in_place() {
        let mut table = SchemaTable::builtin();
        table.insert("HTTP:", SchemaDef::Disabled);
        assert_eq!(table.len(), 5);
        assert!(matches!(table.iter().next(), Some(("http:", SchemaDef::Disabled))));
    }

    #[test]
    fn test_from_json_variants() {
        assert!(matches!(SchemaDef::from_json("a:", &json!("http:")).unwrap(), SchemaDef::Alias(_)));
        assert!(matches!(SchemaDef::from_json("a:", &Value::Null).unwrap(), SchemaDef::Disabled));
        assert!(matches!(
            SchemaDef::from_json("my:", &json!({"validate": "^//[a-z]+"})).unwrap(),
            SchemaDef::Rule(SchemaRule { validate: PatternRule::Source(_), normalize: None })
        ));
    }

    #[test]
    fn test_from_json_bad_definitions() {
        // 场景：布尔值、数组、validate 非字符串、normalize 非空，均为配置错误
        for bad in [
            json!(false),
            json!([]),
            json!({"validate": []}),
            json!({"validate": "^x", "normalize": "bad"}),
            json!({}),
        ] {
            let err = SchemaDef::from_json("test:", &bad).unwrap_err();
            assert!(matches!(err, LinkifyError::Schema { ref name, .. } if name == "test:"));
        }
    }

    #[test]
    fn test_table_from_json_error_names_schema() {
        let err = SchemaTable::from_json(&json!({"fuzzy_link": false})).unwrap_err();
        assert_eq!(err.to_string(), "(LinkifyIt) Invalid schema 'fuzzy_link': 'false'");
    }

    #[test]
    fn test_table_from_iter() {
        let table: SchemaTable = vec![("My:", SchemaDef::source("^x"))].into_iter().collect();
        assert!(table.get("my:").is_some());
    }
}
