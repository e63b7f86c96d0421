//! Access token codec and refresh secret generation.

pub mod jwt;
pub mod refresh;

pub use jwt::{AccessClaims, BEARER_PREFIX, JwtError, TokenCodec, strip_bearer};
pub use refresh::RefreshSecretGenerator;
