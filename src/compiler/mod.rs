//! 编译模块：把 schema 表、选项与顶级域列表编译为可执行的模式集
pub mod assembler;
pub mod pattern;
pub mod compiler;

pub use self::assembler::{PatternAssembler, PatternSources};
pub use self::pattern::{CompiledPatternSet, CompiledSchema, MatchSpans, Matcher};
pub use self::compiler::PatternCompiler;
