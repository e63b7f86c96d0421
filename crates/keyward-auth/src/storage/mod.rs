//! Storage traits for identities, sessions, and revoked access tokens.
//!
//! # Implementations
//!
//! - [`memory`] - In-process backends for tests and single-node deployments
//! - `keyward-auth-postgres` - PostgreSQL identity and session storage
//! - `keyward-auth-redis` - Redis-backed revoked token storage

pub mod identity;
pub mod memory;
pub mod revoked_token;
pub mod session;

pub use identity::IdentityStorage;
pub use memory::{InMemoryIdentityStorage, InMemoryRevokedTokenStorage, InMemorySessionStorage};
pub use revoked_token::RevokedTokenStorage;
pub use session::SessionStorage;
