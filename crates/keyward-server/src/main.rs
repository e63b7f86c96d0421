use std::env;

use keyward_server::config::loader::{DEFAULT_CONFIG_PATH, load_config};
use keyward_server::maintenance::spawn_session_cleanup;
use keyward_server::{ServerBuilder, build_backends};

/// How the configuration path was determined.
#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    CliArgument,
    EnvironmentVariable,
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CliArgument => write!(f, "CLI argument (--config)"),
            Self::EnvironmentVariable => write!(f, "environment variable (KEYWARD_CONFIG)"),
            Self::Default => write!(f, "default"),
        }
    }
}

#[tokio::main]
async fn main() {
    // .env is optional
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    keyward_server::observability::init_tracing();

    let (config_path, source) = resolve_config_path();
    let explicit = !matches!(source, ConfigSource::Default);

    let cfg = match load_config(explicit.then_some(config_path.as_str())) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    tracing::info!(path = %config_path, source = %source, "Configuration loaded");
    keyward_server::observability::apply_logging_level(&cfg.logging.level);

    let backends = match build_backends(&cfg).await {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Backend initialization failed: {e:#}");
            std::process::exit(2);
        }
    };

    let cleanup = spawn_session_cleanup(
        backends.service.clone(),
        backends.memory_revocations.clone(),
        cfg.maintenance.session_cleanup_interval,
    );

    let server = ServerBuilder::new(&cfg).build(backends.service);
    if let Err(err) = server.run().await {
        eprintln!("Server error: {err}");
    }

    if let Some(handle) = cleanup {
        handle.abort();
    }
}

/// Resolve the configuration file path.
///
/// Priority order:
/// 1. CLI argument: --config <path>
/// 2. Environment variable: KEYWARD_CONFIG
/// 3. Default: keyward.toml
fn resolve_config_path() -> (String, ConfigSource) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                return (path, ConfigSource::CliArgument);
            }
        }
    }

    if let Ok(path) = env::var("KEYWARD_CONFIG") {
        if !path.is_empty() {
            return (path, ConfigSource::EnvironmentVariable);
        }
    }

    (DEFAULT_CONFIG_PATH.to_string(), ConfigSource::Default)
}
