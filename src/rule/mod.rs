//! 规则模块：schema 表、校验器/规范化器、匹配结果模型
pub mod model;
pub mod schema;
pub mod validator;

// 导出核心接口
pub use self::model::LinkMatch;
pub use self::schema::{BuiltinRule, PatternRule, SchemaDef, SchemaRule, SchemaTable};
pub use self::validator::{default_normalize, NormalizeFn, Normalizer, ValidateFn, Validator};
