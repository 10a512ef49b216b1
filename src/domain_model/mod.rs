mod credential;
mod signing_key;
mod token;

pub use credential::*;
pub use signing_key::*;
pub use token::*;
