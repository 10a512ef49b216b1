use std::time::Duration;

/// Key-value store holding single-use refresh tokens.
///
/// Each operation is atomic on its own. Keys are refresh token strings; any
/// namespacing is the adapter's business.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Write `key` with `value`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Whether `key` is present and not expired.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove `key` and report whether it was present, as a single operation.
    async fn take(&self, key: &str) -> Result<bool, StoreError>;

    /// Maintenance: remove every key this store owns. Returns the number removed.
    async fn clear_all(&self) -> Result<u64, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
}
