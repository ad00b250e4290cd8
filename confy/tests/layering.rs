//! End-to-end resolution of files and process environment variables.

use anyhow::{Result, anyhow, ensure};
use confy::{Config, ConfigError, Node};
use rstest::rstest;
use serde_json::json;
use serial_test::serial;
use test_helpers::env;
use test_helpers::jail::{jail_error, with_jail, write_file};

#[test]
#[serial]
fn file_and_env_override_defaults() -> Result<()> {
    let config = with_jail(|j| {
        let path = write_file(j, "app.toml", "[db]\nhost = \"file.example.com\"\n")?;
        j.set_env("LAYERTEST_DB_PORT", "6000");
        Config::builder()
            .defaults(json!({"db": {"host": "localhost", "port": 5432}}))
            .file_path(path.display().to_string())
            .prefix("LAYERTEST")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<String>("db.host").as_deref() == Some("file.example.com"));
    let port = config.get("db.port");
    ensure!(port.and_then(Node::as_i64) == Some(6000), "port was {port:?}");
    Ok(())
}

#[test]
#[serial]
fn json_and_toml_files_merge_in_order() -> Result<()> {
    let config = with_jail(|j| {
        write_file(j, "base.toml", "name = \"base\"\n[server]\nport = 80\ntags = [\"a\", \"b\"]\n")?;
        write_file(j, "local.json", r#"{"server": {"tags": ["c"]}, "name": "local"}"#)?;
        Config::builder()
            .file_paths(["base.toml", "local.json", "missing.json"])
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<String>("name").as_deref() == Some("local"));
    ensure!(config.get_as::<Vec<String>>("server.tags") == Some(vec!["c".to_owned()]));
    ensure!(config.get_as::<u16>("server.port") == Some(80));
    ensure!(config.loaded_files().count() == 2);
    Ok(())
}

#[test]
#[serial]
fn namespaced_toml_section_is_addressable() -> Result<()> {
    let config = with_jail(|j| {
        write_file(j, "chunking.toml", "[chunking]\nchunk_size = 2000\n")?;
        Config::builder()
            .add_namespaced_file("chunking.toml", "app")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get("app.chunking.chunk_size").and_then(Node::as_i64) == Some(2000));
    ensure!(config.app("app").contains("chunking.chunk_size"));
    Ok(())
}

#[test]
#[serial]
fn file_paths_expand_variables() -> Result<()> {
    let config = with_jail(|j| {
        write_file(j, "expanded.json", r#"{"expanded": true}"#)?;
        let dir = j.directory().display().to_string();
        j.set_env("LAYERTEST_CONF_DIR", &dir);
        Config::builder()
            .file_path("${LAYERTEST_CONF_DIR}/expanded.json")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<bool>("expanded") == Some(true));
    Ok(())
}

#[rstest]
#[case::unsupported("config.yaml", "key: value\n")]
#[case::bad_toml("config.toml", "key = [\n")]
#[case::bad_json("config.json", "{\"key\": }")]
#[serial]
fn broken_primary_files_abort(#[case] name: &str, #[case] contents: &str) -> Result<()> {
    let outcome = with_jail(|j| {
        write_file(j, name, contents)?;
        Ok(Config::builder()
            .file_path(name)
            .load_dotenv_file(false)
            .build()
            .err())
    })?;
    let Some(err) = outcome else {
        anyhow::bail!("expected {name} to be rejected");
    };
    ensure!(
        matches!(
            &*err,
            ConfigError::UnsupportedFormat { .. } | ConfigError::Parse { .. }
        ),
        "unexpected error: {err}"
    );
    ensure!(err.to_string().contains(name));
    Ok(())
}

#[test]
#[serial]
fn double_underscore_reaches_underscored_mapping() -> Result<()> {
    let config = with_jail(|j| {
        j.set_env("LAYERAPP_FEATURE_FLAGS__BETA_FEATURE", "true");
        Config::builder()
            .defaults(json!({"feature_flags": {"beta_feature": false, "new_ui": false}}))
            .prefix("LAYERAPP")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<bool>("feature_flags.beta_feature") == Some(true));
    ensure!(!config.contains("feature.flags"));
    Ok(())
}

#[test]
#[serial]
fn empty_prefix_preserves_nesting() -> Result<()> {
    let config = with_jail(|j| {
        j.set_env("UNDERSCORE_VAR_TEST", "value");
        Config::builder()
            .prefix("")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<String>("underscore.var.test").as_deref() == Some("value"));
    ensure!(!config.contains("path"));
    Ok(())
}

#[test]
#[serial]
fn unknown_prefixed_keys_flatten() -> Result<()> {
    let config = with_jail(|j| {
        j.set_env("MYAPP_ADDED_BY_ENV", "yes");
        Config::builder()
            .defaults(json!({"existing": 1}))
            .prefix("MYAPP")
            .load_dotenv_file(false)
            .build()
            .map_err(jail_error)
    })?;
    ensure!(config.get_as::<String>("added_by_env").as_deref() == Some("yes"));
    Ok(())
}

#[test]
#[serial]
fn process_environment_is_captured_once_per_build() -> Result<()> {
    let config = {
        let _scope = env::set_vars([("CAPTURE_SERVER_PORT", "8080"), ("CAPTURE_SERVER_TLS", "false")]);
        Config::builder()
            .defaults(json!({"server": {"port": 80, "tls": true}}))
            .prefix("CAPTURE")
            .load_dotenv_file(false)
            .build()
            .map_err(|err| anyhow!("{err}"))?
    };
    ensure!(std::env::var("CAPTURE_SERVER_PORT").is_err());
    ensure!(config.get("server.port").and_then(Node::as_i64) == Some(8080));
    ensure!(config.get_as::<bool>("server.tls") == Some(false));
    Ok(())
}
