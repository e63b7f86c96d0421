use std::{env, fs, time::Duration};

use keyward_server::config::loader::load_config;
use keyward_server::config::{RevocationBackend, StorageBackend};

#[test]
fn config_file_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("keyward.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 9090
request_timeout = "10s"

[auth]
secret_key = "file-secret-file-secret-file-secret-00"
access_token_lifetime = "5m"
refresh_token_lifetime = "24h"

[storage]
backend = "memory"

[revocation]
backend = "redis"

[revocation.redis]
url = "redis://127.0.0.1:6379"

[notifications]
webhook_url = "http://127.0.0.1:9999/hooks"

[logging]
level = "debug"

[maintenance]
session_cleanup_interval = "0s"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) File values are read
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 9090);
    assert_eq!(cfg.server.request_timeout, Duration::from_secs(10));
    assert_eq!(cfg.auth.access_token_lifetime, Duration::from_secs(300));
    assert_eq!(cfg.auth.refresh_token_lifetime, Duration::from_secs(24 * 3600));
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.revocation.backend, RevocationBackend::Redis);
    assert!(cfg.notifications.is_enabled());
    assert!(cfg.maintenance.session_cleanup_interval.is_zero());

    // 2) Env overrides win over the file
    unsafe {
        env::set_var("KEYWARD__SERVER__PORT", "9191");
        env::set_var("KEYWARD__AUTH__SECRET_KEY", "env-secret-env-secret-env-secret-0000");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9191);
    assert_eq!(cfg_env.auth.secret_key, "env-secret-env-secret-env-secret-0000");
    unsafe {
        env::remove_var("KEYWARD__SERVER__PORT");
        env::remove_var("KEYWARD__AUTH__SECRET_KEY");
    }

    // 3) A short secret fails validation
    let invalid_path = dir.path().join("invalid.toml");
    fs::write(&invalid_path, "[auth]\nsecret_key = \"short\"\n").expect("write invalid toml");
    let err = load_config(invalid_path.to_str()).expect_err("expected validation error");
    assert!(err.contains("auth config error"), "{err}");

    // 4) An explicit path that does not exist is an error
    let missing = dir.path().join("missing.toml");
    let err = load_config(missing.to_str()).expect_err("expected missing file error");
    assert!(err.contains("config file not found"));
}
