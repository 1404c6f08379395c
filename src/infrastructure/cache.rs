//! 视图缓存失效
//!
//! 缓存归宿主所有，本库只通过约定的分层键做失效，不读改写缓存内容。
//! 协作方以显式注入的 `CacheInvalidator` 传入，而不是全局单例。

use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::CacheError;

/// 分层缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllProjects,
    UserProjects(String),
    GlobalStats,
}

impl CacheKey {
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::AllProjects => vec!["/api/projects".to_string()],
            Self::UserProjects(user_id) => vec![
                "/api/users".to_string(),
                user_id.clone(),
                "projects".to_string(),
            ],
            Self::GlobalStats => vec!["/api/stats/global".to_string()],
        }
    }

    /// Redis 键前缀，如 `query:/api/users:42:projects`
    pub fn redis_prefix(&self) -> String {
        format!("query:{}", self.segments().join(":"))
    }

    /// 供 `SCAN MATCH` 使用的前缀，glob 元字符已转义
    pub fn redis_match_prefix(&self) -> String {
        escape_glob(&self.redis_prefix())
    }
}

/// 转义 Redis glob 元字符 `* ? [ ] \`
fn escape_glob(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.segments())
    }
}

/// 缓存失效能力
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError>;
}

/// 进程内查询缓存：按分层键存取，失效时删除所有以该键为前缀的条目
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<Vec<String>, Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, key: Vec<String>, value: Value) {
        self.entries.write().await.insert(key, value);
    }

    pub async fn get(&self, key: &[String]) -> Option<Value> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheInvalidator for QueryCache {
    async fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        let prefix = key.segments();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(&prefix));
        tracing::debug!(key = %key, removed = before - entries.len(), "Query cache invalidated");
        Ok(())
    }
}

/// Redis 视图缓存：删除所有匹配键前缀的条目
#[derive(Clone)]
pub struct RedisCacheInvalidator {
    client: redis::Client,
}

impl RedisCacheInvalidator {
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    /// 使用SCAN命令删除匹配模式的所有键
    async fn delete_keys_by_pattern(&self, pattern: &str) -> Result<usize, redis::RedisError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let mut cursor: i64 = 0;
        let mut total_deleted = 0;

        loop {
            let (new_cursor, keys): (i64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let deleted: i64 = redis::cmd("DEL").arg(&keys).query_async(&mut conn).await?;
                total_deleted += deleted as usize;
            }

            cursor = new_cursor;
            if cursor == 0 {
                break;
            }
        }

        Ok(total_deleted)
    }
}

#[async_trait]
impl CacheInvalidator for RedisCacheInvalidator {
    async fn invalidate(&self, key: &CacheKey) -> Result<(), CacheError> {
        let prefix = key.redis_match_prefix();
        // 精确键与其子键都要删除
        let mut removed = self.delete_keys_by_pattern(&prefix).await?;
        removed += self.delete_keys_by_pattern(&format!("{}:*", prefix)).await?;
        tracing::debug!(key = %key, removed, "Redis view cache invalidated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_key_segments() {
        assert_eq!(CacheKey::AllProjects.segments(), seg(&["/api/projects"]));
        assert_eq!(
            CacheKey::UserProjects("u1".into()).segments(),
            seg(&["/api/users", "u1", "projects"])
        );
        assert_eq!(
            CacheKey::UserProjects("u1".into()).redis_prefix(),
            "query:/api/users:u1:projects"
        );
    }

    #[test]
    fn test_match_prefix_escapes_glob() {
        assert_eq!(
            CacheKey::UserProjects("a*b?[c]".into()).redis_match_prefix(),
            r"query:/api/users:a\*b\?\[c\]:projects"
        );
        assert_eq!(
            CacheKey::GlobalStats.redis_match_prefix(),
            "query:/api/stats/global"
        );
    }

    #[tokio::test]
    async fn test_prefix_invalidation() {
        let cache = QueryCache::new();
        cache.put(seg(&["/api/projects"]), json!([])).await;
        cache.put(seg(&["/api/projects", "p1"]), json!({})).await;
        cache.put(seg(&["/api/users", "u1", "projects"]), json!([])).await;
        cache.put(seg(&["/api/users", "u2", "projects"]), json!([])).await;
        cache.put(seg(&["/api/stats/global"]), json!({})).await;

        cache.invalidate(&CacheKey::AllProjects).await.unwrap();
        assert_eq!(cache.len().await, 3);

        cache
            .invalidate(&CacheKey::UserProjects("u1".into()))
            .await
            .unwrap();
        assert!(cache.get(&seg(&["/api/users", "u1", "projects"])).await.is_none());
        assert!(cache.get(&seg(&["/api/users", "u2", "projects"])).await.is_some());

        cache.invalidate(&CacheKey::GlobalStats).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }
}
