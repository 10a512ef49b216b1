use crate::domain_model::*;
use crate::domain_port::StoreError;
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    InvalidToken,
    #[error("refresh token not found or expired")]
    TokenNotFound,
    #[error("signing failure: {0}")]
    SigningFailure(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        AuthError::StoreUnavailable(e.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl From<LoginInput> for Credential {
    fn from(input: LoginInput) -> Self {
        Credential::new(input.username, input.password)
    }
}

#[async_trait::async_trait]
pub trait TokenCodec: Send + Sync {
    async fn issue_access_token(
        &self,
        subject: Option<&str>,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError>;
    async fn issue_refresh_token(
        &self,
        subject: Option<&str>,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError>;
    /// Checks algorithm family and signature. Store presence is the caller's concern.
    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<TokenVerifyResult, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    /// A `SigningFailure` or `StoreUnavailable` raised while reissuing comes after the
    /// presented token was consumed; callers should send the user back to `login`
    /// instead of retrying.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}
