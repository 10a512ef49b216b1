use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::future::Future;
use std::time::Duration;

const SCAN_BATCH: usize = 100;

pub struct RedisTokenStore {
    conn: ConnectionManager,
    prefix: String,
    op_timeout: Duration,
}

impl RedisTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>, op_timeout: Duration) -> Self {
        RedisTokenStore {
            conn,
            prefix: prefix.into(),
            op_timeout,
        }
    }

    fn key(&self, token: &str) -> String {
        format!("{}:{}", self.prefix, token)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, op).await {
            Ok(result) => result.map_err(|e| StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait::async_trait]
impl TokenStore for RedisTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let ttl_secs = ttl.as_secs().max(1);
        self.bounded(async move { conn.set_ex::<_, _, ()>(&key, value, ttl_secs).await })
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.exists::<_, bool>(&key).await })
            .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.del::<_, ()>(&key).await })
            .await
    }

    async fn take(&self, key: &str) -> Result<bool, StoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let removed: i64 = self
            .bounded(async move { conn.del::<_, i64>(&key).await })
            .await?;
        Ok(removed > 0)
    }

    async fn clear_all(&self) -> Result<u64, StoreError> {
        let pattern = format!("{}:*", self.prefix);
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = self
                .bounded(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(&pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;
            if !keys.is_empty() {
                let mut del_conn = self.conn.clone();
                let n: u64 = self
                    .bounded(async move { del_conn.del::<_, u64>(&keys).await })
                    .await?;
                removed += n;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIS_URL: &str = "redis://127.0.0.1:6379";

    async fn store(prefix: &str) -> RedisTokenStore {
        let client = redis::Client::open(REDIS_URL).unwrap();
        let conn = client.get_connection_manager().await.unwrap();
        RedisTokenStore::new(conn, prefix, Duration::from_secs(2))
    }

    #[tokio::test]
    #[ignore = "requires a redis server on 127.0.0.1:6379"]
    async fn set_exists_take() {
        let store = store("rotoken-test-a").await;
        store.clear_all().await.unwrap();

        store.set("r1", "1", Duration::from_secs(60)).await.unwrap();
        assert!(store.exists("r1").await.unwrap());
        assert!(store.take("r1").await.unwrap());
        assert!(!store.take("r1").await.unwrap());
        assert!(!store.exists("r1").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a redis server on 127.0.0.1:6379"]
    async fn clear_all_only_touches_own_prefix() {
        let mine = store("rotoken-test-b").await;
        let theirs = store("rotoken-test-c").await;
        mine.clear_all().await.unwrap();
        theirs.clear_all().await.unwrap();

        mine.set("r1", "1", Duration::from_secs(60)).await.unwrap();
        mine.set("r2", "1", Duration::from_secs(60)).await.unwrap();
        theirs.set("r1", "1", Duration::from_secs(60)).await.unwrap();

        assert_eq!(mine.clear_all().await.unwrap(), 2);
        assert!(theirs.exists("r1").await.unwrap());
        theirs.clear_all().await.unwrap();
    }
}
