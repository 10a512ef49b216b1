mod auth_service_fake;
mod auth_service_impl;
mod credential_verifier_argon2;
mod credential_verifier_static;
mod issuer;
mod rotator;
mod token_codec_jwt;
mod token_pair;

pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use credential_verifier_argon2::*;
pub use credential_verifier_static::*;
pub use issuer::*;
pub use rotator::*;
pub use token_codec_jwt::*;
pub use token_pair::REFRESH_MARKER;
