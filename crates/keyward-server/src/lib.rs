pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod maintenance;
pub mod observability;
pub mod server;

pub use bootstrap::{Backends, build_backends};
pub use config::KeywardConfig;
pub use error::ApiError;
pub use server::{AppState, KeywardServer, ServerBuilder, build_app};
