//! rslinkify - 自动链接识别库，完整支持 Unicode
//!
//! 在自由文本中识别带协议前缀的链接、无前缀的模糊链接（`example.com`）和邮箱，
//! 支持自定义 schema、别名、禁用内置规则以及顶级域列表扩展。
//!
//! ```no_run
//! use rslinkify::Linkifier;
//!
//! let mut linkifier = Linkifier::new()?;
//! if linkifier.test("Site github.com!") {
//!     for m in linkifier.matches("Site github.com!").unwrap_or_default() {
//!         println!("{} -> {}", m.text, m.url);
//!     }
//! }
//! # Ok::<(), rslinkify::LinkifyError>(())
//! ```

// 导出全局错误类型
pub use self::error::{LinkifyError, LinkifyResult};

// 导出配置模块
pub use self::config::{LinkifyOptions, OptionsBuilder, PartialOptions, DEFAULT_BACKTRACK_LIMIT};

// 导出规则模块核心接口
pub use self::rule::{
    BuiltinRule, LinkMatch, NormalizeFn, PatternRule, SchemaDef, SchemaRule, SchemaTable,
    ValidateFn,
};

// 导出编译模块核心接口
pub use self::compiler::{CompiledPatternSet, PatternCompiler};

// 导出扫描模块核心接口
pub use self::scanner::{Linkifier, LinkifierBuilder};

// 导出静态数据
pub use self::utils::{TldList, TLDS, TLDS_2CH_SRC, TLDS_DEFAULT};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod utils;
pub mod compiler;
pub mod scanner;
