use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Value stored under each live refresh token. Only the key's presence matters.
pub const REFRESH_MARKER: &str = "1";

/// Mint an access/refresh pair and persist the refresh token. One store write.
pub(crate) async fn issue_pair(
    codec: &dyn TokenCodec,
    store: &dyn TokenStore,
    subject: Option<&str>,
) -> Result<TokenPair, AuthError> {
    let (access_token, access_exp) = codec.issue_access_token(subject).await?;
    let (refresh_token, refresh_exp) = codec.issue_refresh_token(subject).await?;

    store
        .set(refresh_token.as_str(), REFRESH_MARKER, ttl_until(refresh_exp))
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_token_expires_at: access_exp,
        refresh_token_expires_at: refresh_exp,
    })
}

// Rounded up to whole seconds so a 7-day expiry is stored as exactly 7 days.
fn ttl_until(until: DateTime<Utc>) -> Duration {
    let millis = (until - Utc::now()).num_milliseconds();
    if millis <= 0 {
        Duration::from_secs(1)
    } else {
        Duration::from_secs((millis as u64).div_ceil(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_rounds_up_and_never_drops_to_zero() {
        assert_eq!(ttl_until(Utc::now() - chrono::Duration::hours(1)), Duration::from_secs(1));
        let week = ttl_until(Utc::now() + chrono::Duration::days(7));
        assert_eq!(week, Duration::from_secs(7 * 24 * 60 * 60));
    }
}
