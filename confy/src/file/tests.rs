//! Tests for file parsing, loading and path expansion.

use super::*;
use crate::{ConfigError, ConfigResult};
use camino::Utf8PathBuf;
use rstest::rstest;
use serde_json::{Map, Value, json};
use test_helpers::jail::{jail_error, with_jail, write_file};

fn load_in_jail(name: &str, contents: &str) -> anyhow::Result<ConfigResult<Map<String, Value>>> {
    with_jail(|jail| {
        let path = write_file(jail, name, contents)?;
        let utf8 = Utf8PathBuf::from_path_buf(path).map_err(|p| jail_error(p.display()))?;
        Ok(StructuredFileLoader.load(&utf8))
    })
}

#[rstest]
#[case::json("config.json", r#"{"db": {"host": "h", "port": 1}, "flag": null}"#)]
#[case::toml("config.toml", "flag = \"\"\n[db]\nhost = \"h\"\nport = 1\n")]
#[case::upper_ext("CONFIG.TOML", "[db]\nhost = \"h\"\nport = 1\n")]
fn loads_supported_formats(#[case] name: &str, #[case] contents: &str) -> anyhow::Result<()> {
    let map = load_in_jail(name, contents)?.map_err(|e| anyhow::anyhow!("{e}"))?;
    anyhow::ensure!(map.get("db") == Some(&json!({"host": "h", "port": 1})));
    Ok(())
}

#[rstest]
#[case("empty.json")]
#[case("empty.toml")]
fn empty_files_yield_empty_mapping(#[case] name: &str) -> anyhow::Result<()> {
    let map = load_in_jail(name, "  \n")?.map_err(|e| anyhow::anyhow!("{e}"))?;
    anyhow::ensure!(map.is_empty());
    Ok(())
}

#[rstest]
#[case("bad.json", "{\"a\": ")]
#[case("bad.toml", "a = [")]
#[case("list.json", "[1, 2]")]
fn malformed_files_report_parse_errors(#[case] name: &str, #[case] contents: &str) -> anyhow::Result<()> {
    let err = load_in_jail(name, contents)?.expect_err("malformed");
    anyhow::ensure!(
        matches!(&*err, ConfigError::Parse { path, .. } if path.ends_with(name)),
        "unexpected error: {err}"
    );
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> anyhow::Result<()> {
    let err = load_in_jail("config.yaml", "a: 1")?.expect_err("yaml");
    anyhow::ensure!(
        matches!(&*err, ConfigError::UnsupportedFormat { extension, .. } if extension == "yaml")
    );
    Ok(())
}

#[test]
fn missing_file_is_not_found() {
    let err = StructuredFileLoader
        .load(camino::Utf8Path::new("/nonexistent/confy/app.toml"))
        .expect_err("missing");
    assert!(err.is_not_found());
}

#[rstest]
#[case("$APP_DIR/config.toml", "/srv/app/config.toml")]
#[case("${APP_DIR}/config.toml", "/srv/app/config.toml")]
#[case("$APP_DIR_X/config.toml", "$APP_DIR_X/config.toml")]
#[case("cost$/x.json", "cost$/x.json")]
#[case("${UNCLOSED/x.json", "${UNCLOSED/x.json")]
#[case("plain/x.json", "plain/x.json")]
fn expands_variables(#[case] raw: &str, #[case] expected: &str) {
    let lookup = |name: &str| (name == "APP_DIR").then(|| "/srv/app".to_owned());
    assert_eq!(expand_path_with(raw, lookup), expected);
}

#[test]
fn expands_home_directory() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    let expanded = expand_path_with("~/cfg/app.toml", |_| None);
    assert_eq!(expanded.as_std_path(), home.join("cfg/app.toml"));
    assert_eq!(expand_path_with("~other/x", |_| None), "~other/x");
}

#[test]
fn resolve_path_is_absolute() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let file = dir.path().join("app.toml");
    std::fs::write(&file, "")?;
    let raw = file.to_str().ok_or_else(|| anyhow::anyhow!("non UTF-8 temp path"))?;
    let resolved = resolve_path(raw).map_err(|e| anyhow::anyhow!("{e}"))?;
    anyhow::ensure!(resolved.is_absolute());
    anyhow::ensure!(resolved.as_std_path() == std::fs::canonicalize(&file)?);

    let missing = resolve_path("relative/missing.toml").map_err(|e| anyhow::anyhow!("{e}"))?;
    anyhow::ensure!(missing.is_absolute());
    anyhow::ensure!(missing.ends_with("relative/missing.toml"));
    Ok(())
}
