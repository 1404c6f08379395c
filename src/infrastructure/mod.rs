//! 基础设施层：日志初始化与视图缓存失效后端

pub mod cache;
pub mod logging;

pub use cache::{CacheInvalidator, CacheKey, QueryCache, RedisCacheInvalidator};
