use crate::domain_model::Credential;

/// External predicate deciding whether a credential is acceptable.
#[async_trait::async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credential: &Credential) -> bool;
}
