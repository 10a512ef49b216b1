use crate::application_port::*;
use crate::domain_model::*;
use crate::logger::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every refresh token is signed with this; verification accepts the whole HMAC family.
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: SigningKey,
    /// Reject refresh tokens whose `exp` claim has passed, on top of the store TTL.
    pub check_refresh_expiry: bool,
}

impl JwtConfig {
    pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(24 * 60 * 60); // 1 day
    pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days

    pub fn new(issuer: impl Into<String>, signing_key: SigningKey) -> Self {
        JwtConfig {
            issuer: issuer.into(),
            access_ttl: Self::DEFAULT_ACCESS_TTL,
            refresh_ttl: Self::DEFAULT_REFRESH_TTL,
            signing_key,
            check_refresh_expiry: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    exp: i64,
    iat: i64,
    iss: String,
    jti: String,
}

// Only the signature of a refresh token matters, so every claim is optional on the way in.
#[derive(Debug, Serialize, Deserialize)]
struct RefreshClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    iss: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

fn sign<T: Serialize>(claims: &T, cfg: &JwtConfig) -> Result<String, AuthError> {
    encode(
        &Header::new(SIGNING_ALGORITHM),
        claims,
        &EncodingKey::from_secret(cfg.signing_key.as_bytes()),
    )
    .map_err(|e| AuthError::SigningFailure(e.to_string()))
}

fn expiry(iat: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AuthError> {
    let ttl = chrono::Duration::from_std(ttl).map_err(|e| AuthError::SigningFailure(e.to_string()))?;
    iat.checked_add_signed(ttl)
        .ok_or_else(|| AuthError::SigningFailure("token expiry out of range".to_string()))
}

fn encode_access(subject: Option<&str>, cfg: &JwtConfig) -> Result<(String, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = expiry(iat_dt, cfg.access_ttl)?;
    let claims = AccessClaims {
        sub: subject.map(str::to_string),
        exp: exp_dt.timestamp(),
        iat: iat_dt.timestamp(),
        iss: cfg.issuer.clone(),
        jti: new_jti(),
    };
    Ok((sign(&claims, cfg)?, exp_dt))
}

fn encode_refresh(subject: Option<&str>, cfg: &JwtConfig) -> Result<(String, DateTime<Utc>), AuthError> {
    let iat_dt = Utc::now();
    let exp_dt = expiry(iat_dt, cfg.refresh_ttl)?;
    let claims = RefreshClaims {
        sub: subject.map(str::to_string),
        exp: Some(exp_dt.timestamp()),
        iat: Some(iat_dt.timestamp()),
        iss: Some(cfg.issuer.clone()),
        jti: Some(new_jti()),
    };
    Ok((sign(&claims, cfg)?, exp_dt))
}

fn refresh_validation(cfg: &JwtConfig) -> Validation {
    let mut v = Validation::new(SIGNING_ALGORITHM);
    v.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    v.validate_exp = cfg.check_refresh_expiry;
    if cfg.check_refresh_expiry {
        v.leeway = 0;
        v.set_required_spec_claims(&["exp"]);
    } else {
        v.required_spec_claims.clear();
    }
    v
}

fn decode_refresh(token: &str, cfg: &JwtConfig) -> Result<RefreshClaims, AuthError> {
    let data = decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(cfg.signing_key.as_bytes()),
        &refresh_validation(cfg),
    )
    .map_err(|e| {
        debug!(kind = ?e.kind(), "refresh token rejected");
        AuthError::InvalidToken
    })?;
    Ok(data.claims)
}

#[inline]
fn new_jti() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        JwtHs256Codec { cfg }
    }
}

#[async_trait::async_trait]
impl TokenCodec for JwtHs256Codec {
    async fn issue_access_token(
        &self,
        subject: Option<&str>,
    ) -> Result<(AccessToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = encode_access(subject, &self.cfg)?;
        Ok((AccessToken(token), exp_dt))
    }

    async fn issue_refresh_token(
        &self,
        subject: Option<&str>,
    ) -> Result<(RefreshToken, DateTime<Utc>), AuthError> {
        let (token, exp_dt) = encode_refresh(subject, &self.cfg)?;
        Ok((RefreshToken(token), exp_dt))
    }

    async fn verify_refresh_token(
        &self,
        token: &RefreshToken,
    ) -> Result<TokenVerifyResult, AuthError> {
        let claims = decode_refresh(&token.0, &self.cfg)?;
        Ok(TokenVerifyResult {
            subject: claims.sub,
            jti: claims.jti,
        })
    }
}
