use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::{Credentials, Settings};
use anyhow::anyhow;
use std::sync::Arc;
use std::time::Duration;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    token_store: Arc<dyn TokenStore>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_store: Arc<dyn TokenStore> = match settings.store.backend.as_str() {
            "memory" => Arc::new(MemoryTokenStore::new()),
            "redis" => {
                let redis_client = redis::Client::open(settings.store.url.as_str())?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisTokenStore::new(
                    redis_manager,
                    settings.store.prefix.clone(),
                    Duration::from_millis(settings.store.op_timeout_ms),
                ))
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeAuthService::new()),
            "real" => {
                let verifier = build_verifier(&settings.credentials)?;

                let signing_key = resolve_signing_key(
                    std::env::var("JWT_SIGNING_KEY").ok(),
                    settings.auth.signing_key.as_deref(),
                )?;
                let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
                    issuer: settings.auth.issuer.clone(),
                    access_ttl: Duration::from_secs(settings.auth.access_ttl_secs),
                    refresh_ttl: Duration::from_secs(settings.auth.refresh_ttl_secs),
                    signing_key,
                    check_refresh_expiry: settings.auth.check_refresh_expiry,
                }));

                let strategy = match settings.auth.consume.as_str() {
                    "atomic" => ConsumeStrategy::Atomic,
                    "check_then_delete" => ConsumeStrategy::CheckThenDelete,
                    other => return Err(anyhow!("Unknown consume strategy: {}", other)),
                };

                Arc::new(RealAuthService::new(
                    Issuer::new(verifier, token_codec.clone(), token_store.clone()),
                    Rotator::new(token_codec, token_store.clone(), strategy),
                ))
            }
            other => return Err(anyhow!("Unknown auth backend: {}", other)),
        };

        info!(
            store = %settings.store.backend,
            auth = %settings.auth.backend,
            "server initialized"
        );

        Ok(Server {
            auth_service,
            token_store,
        })
    }

    /// Maintenance: drop every stored refresh token, logging everyone out.
    pub async fn clear_refresh_tokens(&self) -> anyhow::Result<u64> {
        let removed = self.token_store.clear_all().await?;
        warn!(removed, "cleared refresh token store");
        Ok(removed)
    }
}

const PLACEHOLDER_KEY: &str = "change-me";

/// The environment wins over the settings file. Missing, empty or placeholder keys are
/// refused so tokens are never signed with a publicly known secret.
fn resolve_signing_key(env: Option<String>, configured: Option<&str>) -> anyhow::Result<SigningKey> {
    let key = env
        .filter(|k| !k.is_empty())
        .or_else(|| configured.map(str::to_string))
        .ok_or_else(|| anyhow!("no signing key: set JWT_SIGNING_KEY or auth.signing_key"))?;
    if key == PLACEHOLDER_KEY {
        return Err(anyhow!("signing key is still the placeholder {:?}", PLACEHOLDER_KEY));
    }
    SigningKey::new(key).ok_or_else(|| anyhow!("signing key must not be empty"))
}

fn build_verifier(credentials: &Credentials) -> anyhow::Result<Arc<dyn CredentialVerifier>> {
    if credentials.users.is_empty() {
        warn!(backend = %credentials.backend, "no users configured, every login will be rejected");
    }
    let users = credentials
        .users
        .iter()
        .map(|u| (u.username.clone(), u.secret.clone()));
    match credentials.backend.as_str() {
        "static" => Ok(Arc::new(StaticCredentialVerifier::new(users))),
        "argon2" => Ok(Arc::new(Argon2CredentialVerifier::new(users))),
        other => Err(anyhow!("Unknown credentials backend: {}", other)),
    }
}
