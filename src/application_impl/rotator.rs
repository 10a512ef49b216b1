use super::token_pair::issue_pair;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// How the rotator retires the presented refresh token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsumeStrategy {
    /// `exists` then `delete`. Two concurrent refreshes with the same token can both
    /// pass the check and both succeed.
    CheckThenDelete,
    /// A single `take`; exactly one concurrent caller wins.
    #[default]
    Atomic,
}

/// Exchanges a live refresh token for a new pair, consuming the old one.
pub struct Rotator {
    token_codec: Arc<dyn TokenCodec>,
    token_store: Arc<dyn TokenStore>,
    strategy: ConsumeStrategy,
}

impl Rotator {
    pub fn new(
        token_codec: Arc<dyn TokenCodec>,
        token_store: Arc<dyn TokenStore>,
        strategy: ConsumeStrategy,
    ) -> Self {
        Self {
            token_codec,
            token_store,
            strategy,
        }
    }

    pub async fn refresh(&self, refresh_token: &RefreshToken) -> Result<TokenPair, AuthError> {
        let verified = match self.token_codec.verify_refresh_token(refresh_token).await {
            Ok(verified) => verified,
            Err(e) => {
                warn!("refresh token failed verification");
                return Err(e);
            }
        };
        let jti = verified.jti.as_deref().unwrap_or("-");

        if !self.consume(refresh_token).await? {
            warn!(jti, "refresh token not found or already used");
            return Err(AuthError::TokenNotFound);
        }

        // The old token is gone; from here on a failure means the caller must log in again.
        let pair = issue_pair(
            self.token_codec.as_ref(),
            self.token_store.as_ref(),
            verified.subject.as_deref(),
        )
        .await
        .inspect_err(|e| error!(jti, "refresh token consumed but reissue failed: {}", e))?;

        info!(jti, "refresh token rotated");
        Ok(pair)
    }

    async fn consume(&self, refresh_token: &RefreshToken) -> Result<bool, AuthError> {
        let key = refresh_token.as_str();
        match self.strategy {
            ConsumeStrategy::Atomic => Ok(self.token_store.take(key).await?),
            ConsumeStrategy::CheckThenDelete => {
                if !self.token_store.exists(key).await? {
                    return Ok(false);
                }
                self.token_store.delete(key).await?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::infra_memory::MemoryTokenStore;
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn codec() -> Arc<JwtHs256Codec> {
        Arc::new(JwtHs256Codec::new(JwtConfig::new(
            "rotoken.test",
            SigningKey::new("rotator-test-key").unwrap(),
        )))
    }

    async fn seeded(store: &MemoryTokenStore, codec: &JwtHs256Codec) -> RefreshToken {
        let (token, _) = codec.issue_refresh_token(Some("dummy")).await.unwrap();
        store
            .set(token.as_str(), REFRESH_MARKER, JwtConfig::DEFAULT_REFRESH_TTL)
            .await
            .unwrap();
        token
    }

    #[tokio::test]
    async fn rotation_replaces_the_stored_token() {
        for strategy in [ConsumeStrategy::Atomic, ConsumeStrategy::CheckThenDelete] {
            let store = Arc::new(MemoryTokenStore::new());
            let codec = codec();
            let old = seeded(&store, &codec).await;
            let rotator = Rotator::new(codec, store.clone(), strategy);

            let pair = rotator.refresh(&old).await.unwrap();

            assert_ne!(pair.refresh_token, old);
            assert!(!store.exists(old.as_str()).await.unwrap());
            assert!(store.exists(pair.refresh_token.as_str()).await.unwrap());
            assert_eq!(store.len(), 1);
        }
    }

    #[tokio::test]
    async fn second_use_is_not_found() {
        for strategy in [ConsumeStrategy::Atomic, ConsumeStrategy::CheckThenDelete] {
            let store = Arc::new(MemoryTokenStore::new());
            let codec = codec();
            let old = seeded(&store, &codec).await;
            let rotator = Rotator::new(codec, store.clone(), strategy);

            rotator.refresh(&old).await.unwrap();
            let err = rotator.refresh(&old).await.unwrap_err();
            assert!(matches!(err, AuthError::TokenNotFound));
        }
    }

    #[tokio::test]
    async fn signed_but_never_stored_is_not_found() {
        let store = Arc::new(MemoryTokenStore::new());
        let codec = codec();
        let (never_stored, _) = codec.issue_refresh_token(None).await.unwrap();
        let rotator = Rotator::new(codec, store.clone(), ConsumeStrategy::default());

        let err = rotator.refresh(&never_stored).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenNotFound));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn bad_signature_does_not_touch_the_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let codec = codec();
        let old = seeded(&store, &codec).await;
        let rotator = Rotator::new(codec, store.clone(), ConsumeStrategy::default());

        let mut tampered = old.as_str().to_string();
        tampered.push('x');
        let err = rotator.refresh(&RefreshToken(tampered)).await.unwrap_err();

        assert!(matches!(err, AuthError::InvalidToken));
        assert!(store.exists(old.as_str()).await.unwrap());
    }

    const RACERS: usize = 8;

    /// Holds every caller at the consume step until all of them have arrived, so the
    /// racers hit the store together regardless of scheduling.
    struct LockstepStore {
        inner: MemoryTokenStore,
        barrier: Barrier,
    }

    #[async_trait::async_trait]
    impl TokenStore for LockstepStore {
        async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
            self.inner.set(key, value, ttl).await
        }

        async fn exists(&self, key: &str) -> Result<bool, StoreError> {
            let found = self.inner.exists(key).await;
            self.barrier.wait().await;
            found
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.inner.delete(key).await
        }

        async fn take(&self, key: &str) -> Result<bool, StoreError> {
            self.barrier.wait().await;
            self.inner.take(key).await
        }

        async fn clear_all(&self) -> Result<u64, StoreError> {
            self.inner.clear_all().await
        }
    }

    /// Replays one token from `RACERS` tasks at once; returns how many got a new pair.
    async fn race(strategy: ConsumeStrategy) -> (usize, Arc<LockstepStore>) {
        let store = Arc::new(LockstepStore {
            inner: MemoryTokenStore::new(),
            barrier: Barrier::new(RACERS),
        });
        let codec = codec();
        let old = seeded(&store.inner, &codec).await;
        let rotator = Arc::new(Rotator::new(codec, store.clone(), strategy));

        let handles: Vec<_> = (0..RACERS)
            .map(|_| {
                let rotator = rotator.clone();
                let old = old.clone();
                tokio::spawn(async move { rotator.refresh(&old).await })
            })
            .collect();

        let mut won = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(e) => assert!(matches!(e, AuthError::TokenNotFound)),
            }
        }
        (won, store)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn atomic_consume_admits_one_concurrent_winner() {
        let (won, store) = race(ConsumeStrategy::Atomic).await;
        assert_eq!(won, 1);
        assert_eq!(store.inner.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn check_then_delete_lets_concurrent_replays_through() {
        let (won, store) = race(ConsumeStrategy::CheckThenDelete).await;
        assert_eq!(won, RACERS);
        assert_eq!(store.inner.len(), RACERS);
    }
}
