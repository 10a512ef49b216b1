use crate::application_port::*;
use crate::domain_model::*;
use chrono::{Duration, Utc};

/// Deterministic tokens, no store. For wiring outer layers in development.
#[derive(Debug, Default)]
pub struct FakeAuthService;

impl FakeAuthService {
    pub fn new() -> Self {
        Self
    }
}

// Any non-blank login succeeds and refresh only checks the token prefix.
// Single-use is not simulated.
#[async_trait::async_trait]
impl AuthService for FakeAuthService {
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        if request.username.is_empty() || request.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(get_fake_pair(&request.username))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        match refresh_token.strip_prefix("fake-refresh-token:") {
            Some(username) if !username.is_empty() => Ok(get_fake_pair(username)),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

fn get_fake_pair(username: &str) -> TokenPair {
    let now = Utc::now();
    TokenPair {
        access_token: AccessToken(format!("fake-access-token:{}", username)),
        access_token_expires_at: now + Duration::days(1), // 1 day
        refresh_token: RefreshToken(format!("fake-refresh-token:{}", username)),
        refresh_token_expires_at: now + Duration::days(7), // 7 days
    }
}
