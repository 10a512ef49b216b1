use super::token_pair::issue_pair;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Exchanges a credential for a fresh token pair.
pub struct Issuer {
    verifier: Arc<dyn CredentialVerifier>,
    token_codec: Arc<dyn TokenCodec>,
    token_store: Arc<dyn TokenStore>,
}

impl Issuer {
    pub fn new(
        verifier: Arc<dyn CredentialVerifier>,
        token_codec: Arc<dyn TokenCodec>,
        token_store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            verifier,
            token_codec,
            token_store,
        }
    }

    /// Nothing touches the store unless the credential is accepted.
    pub async fn login(&self, credential: &Credential) -> Result<TokenPair, AuthError> {
        if credential.is_blank() || !self.verifier.verify(credential).await {
            warn!(username = %credential.username, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let pair = issue_pair(
            self.token_codec.as_ref(),
            self.token_store.as_ref(),
            Some(&credential.username),
        )
        .await?;

        info!(username = %credential.username, "login succeeded");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::*;
    use crate::infra_memory::MemoryTokenStore;

    fn issuer(store: Arc<MemoryTokenStore>) -> Issuer {
        let codec = JwtHs256Codec::new(JwtConfig::new(
            "rotoken.test",
            SigningKey::new("issuer-test-key").unwrap(),
        ));
        Issuer::new(
            Arc::new(StaticCredentialVerifier::new([("dummy", "dummy")])),
            Arc::new(codec),
            store,
        )
    }

    #[tokio::test]
    async fn login_persists_refresh_token() {
        let store = Arc::new(MemoryTokenStore::new());
        let pair = issuer(store.clone())
            .login(&Credential::new("dummy", "dummy"))
            .await
            .unwrap();

        assert!(!pair.access_token.as_str().is_empty());
        assert!(!pair.refresh_token.as_str().is_empty());
        assert!(store.exists(pair.refresh_token.as_str()).await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn rejected_login_writes_nothing() {
        let store = Arc::new(MemoryTokenStore::new());
        let err = issuer(store.clone())
            .login(&Credential::new("wrong", "creds"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "invalid credentials");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn blank_credentials_are_rejected() {
        let store = Arc::new(MemoryTokenStore::new());
        let issuer = issuer(store.clone());
        for (u, s) in [("", "dummy"), ("dummy", ""), ("", "")] {
            let err = issuer.login(&Credential::new(u, s)).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        assert_eq!(store.len(), 0);
    }
}
