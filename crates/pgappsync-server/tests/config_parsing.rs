use std::{env, fs};

use pgappsync_schema::CacheMode;
use pgappsync_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("pgappsync.toml");

    let toml_content = r#"
[postgres]
host = "proxy.example.internal"
port = 5432
database = "blog"
user = "app_user"
iam_auth = true
region = "eu-west-1"
namespaces = ["app_public", "app_private"]

[appsync]
api_id = "abcdefghijkl"
function_id = "fn-resolver"
poll_interval_ms = 500

[schema]
cache_path = "/opt/lib/schema.json"
force_nullable_inputs = ["id", "rowId"]

[server]
port = 9000
execution_timeout_ms = 20000

[sync]
timeout_ms = 120000

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.postgres.host, "proxy.example.internal");
    assert!(cfg.postgres.iam_auth);
    assert_eq!(cfg.postgres.namespaces, ["app_public", "app_private"]);
    assert_eq!(cfg.postgres.credential_lifetime_secs, 14 * 60);
    assert_eq!(cfg.appsync.target(), Ok(("abcdefghijkl", "fn-resolver")));
    assert_eq!(cfg.appsync.poll_interval_ms, 500);
    assert_eq!(
        cfg.schema.read_mode(),
        CacheMode::Read("/opt/lib/schema.json".into())
    );
    assert!(cfg.schema.comment_descriptions);
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.logging.level, "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("PGAPPSYNC__SERVER__PORT", "9191");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9191);
    unsafe {
        env::remove_var("PGAPPSYNC__SERVER__PORT");
    }

    // 3) List values from the environment are comma-separated
    unsafe {
        env::set_var("PGAPPSYNC__POSTGRES__NAMESPACES", "app_public,app_hidden");
        env::set_var("PGAPPSYNC__SCHEMA__FORCE_NULLABLE_INPUTS", "nodeId");
        env::set_var("PGAPPSYNC__POSTGRES__DATABASE", "blog,archive");
    }
    let cfg_lists = load_config(path.to_str()).expect("should parse list overrides");
    assert_eq!(cfg_lists.postgres.namespaces, ["app_public", "app_hidden"]);
    assert_eq!(cfg_lists.schema.force_nullable_inputs, ["nodeId"]);
    assert_eq!(cfg_lists.postgres.database, "blog,archive");
    unsafe {
        env::remove_var("PGAPPSYNC__POSTGRES__NAMESPACES");
        env::remove_var("PGAPPSYNC__SCHEMA__FORCE_NULLABLE_INPUTS");
        env::remove_var("PGAPPSYNC__POSTGRES__DATABASE");
    }

    // 4) Validation failure: execution timeout must stay below the sync timeout
    let invalid = toml_content.replace("timeout_ms = 120000", "timeout_ms = 10000");
    fs::write(&path, invalid).expect("write invalid toml");
    let err = load_config(path.to_str()).expect_err("should fail validation");
    assert!(err.contains("execution_timeout_ms"), "unexpected error: {err}");

    // 5) Missing explicit file is an error
    let missing = dir.path().join("missing.toml");
    let err = load_config(missing.to_str()).expect_err("missing file");
    assert!(err.contains("not found"));
}
