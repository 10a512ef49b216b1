mod credential_verifier;
mod token_store;

pub use credential_verifier::*;
pub use token_store::*;
