use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::*;

/// `AuthService` backed by an [`Issuer`] and a [`Rotator`] sharing one token store.
pub struct RealAuthService {
    issuer: Issuer,
    rotator: Rotator,
}

impl RealAuthService {
    pub fn new(issuer: Issuer, rotator: Rotator) -> Self {
        Self { issuer, rotator }
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let credential: Credential = request.into();
        self.issuer.login(&credential).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.rotator
            .refresh(&RefreshToken(refresh_token.to_string()))
            .await
    }
}
