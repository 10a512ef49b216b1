use crate::domain_model::*;
use crate::domain_port::*;
use std::collections::HashMap;

/// Accepts a fixed set of plaintext username/secret pairs. Meant for development.
#[derive(Debug, Default)]
pub struct StaticCredentialVerifier {
    users: HashMap<String, String>,
}

impl StaticCredentialVerifier {
    pub fn new<I, U, S>(users: I) -> Self
    where
        I: IntoIterator<Item = (U, S)>,
        U: Into<String>,
        S: Into<String>,
    {
        StaticCredentialVerifier {
            users: users
                .into_iter()
                .map(|(u, s)| (u.into(), s.into()))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl CredentialVerifier for StaticCredentialVerifier {
    async fn verify(&self, credential: &Credential) -> bool {
        self.users
            .get(&credential.username)
            .is_some_and(|secret| *secret == credential.secret)
    }
}
