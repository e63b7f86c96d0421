//! Domain types shared by the session service and its storage backends.
//!
//! - [`Fingerprint`] - Client metadata a session is bound to
//! - [`Session`] - A persisted login session
//! - [`TokenPair`] - Access token and refresh secret handed to the client

pub mod fingerprint;
pub mod session;

pub use fingerprint::Fingerprint;
pub use session::{NewSession, Session, SessionId, TokenPair};
