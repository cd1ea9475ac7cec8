pub mod cache;
pub mod resolver;

pub use cache::{CacheKey, IconCache};
pub use resolver::{IconImage, IconResolver, SharedIcon, ShellIconResolver};
