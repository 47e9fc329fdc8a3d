//! 工具模块：静态字符类与顶级域数据
pub mod char_class;
pub mod tlds;

pub use self::tlds::{TldList, TLDS, TLDS_2CH_SRC, TLDS_DEFAULT};
