//! 扫描模块：链接识别器与扫描缓存
pub mod cache;
pub mod linkifier;
pub mod segment;

pub use self::cache::{ScanCache, ScanHit, ScanState};
pub use self::linkifier::{Linkifier, LinkifierBuilder};
