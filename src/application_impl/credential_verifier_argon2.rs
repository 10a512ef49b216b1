use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use std::collections::HashMap;

/// Verifies secrets against Argon2 PHC hashes keyed by username.
#[derive(Debug, Default)]
pub struct Argon2CredentialVerifier {
    hashes: HashMap<String, String>,
}

impl Argon2CredentialVerifier {
    pub fn new<I, U, H>(hashes: I) -> Self
    where
        I: IntoIterator<Item = (U, H)>,
        U: Into<String>,
        H: Into<String>,
    {
        Argon2CredentialVerifier {
            hashes: hashes
                .into_iter()
                .map(|(u, h)| (u.into(), h.into()))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for Argon2CredentialVerifier {
    async fn verify(&self, credential: &Credential) -> bool {
        let Some(password_hash) = self.hashes.get(&credential.username) else {
            return false;
        };
        let parsed = match PasswordHash::new(password_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(username = %credential.username, "invalid PHC hash: {}", e);
                return false;
            }
        };

        match Argon2::default().verify_password(credential.secret.as_bytes(), &parsed) {
            Ok(_) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(username = %credential.username, "verify error: {}", e);
                false
            }
        }
    }
}
