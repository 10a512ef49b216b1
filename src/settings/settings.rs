use anyhow::{Result, anyhow};
use config::{Config, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub credentials: Credentials,
    pub store: Store,
    pub log: Log,
}

#[derive(Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
    pub issuer: String,
    /// Falls back to `JWT_SIGNING_KEY`; startup fails when neither is set.
    #[serde(default)]
    pub signing_key: Option<String>,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
    #[serde(default = "default_consume")]
    pub consume: String, // "atomic" or "check_then_delete"
    #[serde(default)]
    pub check_refresh_expiry: bool,
}

// Hand-written so the signing key never reaches the logs.
impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("backend", &self.backend)
            .field("issuer", &self.issuer)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("consume", &self.consume)
            .field("check_refresh_expiry", &self.check_refresh_expiry)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub backend: String, // "static" or "argon2"
    #[serde(default)]
    pub users: Vec<CredentialUser>,
}

#[derive(Deserialize)]
pub struct CredentialUser {
    pub username: String,
    /// Plaintext for the "static" backend, a PHC string for "argon2".
    pub secret: String,
}

impl std::fmt::Debug for CredentialUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialUser")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_access_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_refresh_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

fn default_consume() -> String {
    "atomic".to_string()
}

fn default_prefix() -> String {
    "refresh".to_string()
}

fn default_op_timeout_ms() -> u64 {
    2000
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_settings_parse() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        assert_eq!(settings.auth.backend, "real");
        assert_eq!(settings.auth.refresh_ttl_secs, 7 * 24 * 60 * 60);
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.credentials.users.len(), 1);
        let signing_key = settings.auth.signing_key.as_deref().unwrap();
        assert!(!format!("{:?}", settings).contains(signing_key));
    }

    #[test]
    fn release_settings_carry_no_signing_key() {
        let settings = parse_settings(Some("settings/release.toml")).unwrap();
        assert!(settings.auth.signing_key.is_none());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
