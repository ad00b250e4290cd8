//! Tests for the resolution pipeline using in-memory collaborators.

use std::collections::BTreeMap;

use camino::Utf8Path;
use rstest::{fixture, rstest};
use serde_json::{Map, Value, json};

use super::*;
use crate::{ConfigError, ConfigResult, EnvSnapshot, FileLoader, Node};

/// Serves file contents from memory keyed by path.
#[derive(Clone, Debug, Default)]
struct MemoryFiles(BTreeMap<String, Value>);

impl MemoryFiles {
    fn with(mut self, path: &str, contents: Value) -> Self {
        self.0.insert(path.to_owned(), contents);
        self
    }
}

impl FileLoader for MemoryFiles {
    fn load(&self, path: &Utf8Path) -> ConfigResult<Map<String, Value>> {
        match self.0.get(path.as_str()) {
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(_) => Err(ConfigError::parse(path.as_std_path(), "top level is not a mapping")),
            None => Err(ConfigError::not_found(path.as_std_path())),
        }
    }
}

#[fixture]
fn builder() -> ConfigBuilder {
    Config::builder()
        .load_dotenv_file(false)
        .env_snapshot(EnvSnapshot::new())
}

#[rstest]
fn defaults_files_env_and_overrides_follow_precedence(builder: ConfigBuilder) {
    let files = MemoryFiles::default()
        .with("/etc/app.toml", json!({"db": {"host": "file.example.com"}, "level": "file"}))
        .with("local.json", json!({"level": "local"}));
    let config = builder
        .defaults(json!({"db": {"host": "localhost", "port": 5432}, "level": "default", "keep": 1}))
        .file_path("/etc/app.toml")
        .add_file("local.json")
        .prefix("PREFIX")
        .env_snapshot(EnvSnapshot::from_iter([("PREFIX_DB_PORT", "6000"), ("PREFIX_LEVEL", "env")]))
        .override_value("level", json!("override"))
        .file_loader(files)
        .build()
        .expect("resolves");

    assert_eq!(config.get_as::<String>("db.host").as_deref(), Some("file.example.com"));
    assert_eq!(config.get("db.port").and_then(Node::as_i64), Some(6000));
    assert_eq!(config.get_as::<String>("level").as_deref(), Some("override"));
    assert_eq!(config.get_as::<i64>("keep"), Some(1));
    assert_eq!(
        config.loaded_files().map(Utf8Path::as_str).collect::<Vec<_>>(),
        ["/etc/app.toml", "local.json"]
    );
}

#[rstest]
fn app_defaults_sit_between_defaults_and_initial(builder: ConfigBuilder) {
    let config = builder
        .defaults(json!({"myapp": {"a": "defaults", "b": "defaults", "c": "defaults"}}))
        .app_defaults("myapp", json!({"b": "app", "c": "app"}))
        .initial(json!({"myapp": {"c": "initial"}}))
        .build()
        .expect("resolves");
    let app = config.app("myapp");
    assert_eq!(app.get_as::<String>("a").as_deref(), Some("defaults"));
    assert_eq!(app.get_as::<String>("b").as_deref(), Some("app"));
    assert_eq!(app.get_as::<String>("c").as_deref(), Some("initial"));
}

#[rstest]
fn missing_primary_file_fails(builder: ConfigBuilder) {
    let err = builder
        .file_path("/missing/app.toml")
        .file_loader(MemoryFiles::default())
        .build()
        .expect_err("primary missing");
    assert!(err.is_not_found());
}

#[rstest]
fn missing_extra_files_are_skipped(builder: ConfigBuilder) {
    let files = MemoryFiles::default().with("present.json", json!({"x": 1}));
    let config = builder
        .add_file("absent.json")
        .add_namespaced_file("absent-ns.toml", "tool")
        .add_file("present.json")
        .file_loader(files)
        .build()
        .expect("extras skipped");
    assert_eq!(config.get_as::<i64>("x"), Some(1));
    assert_eq!(config.loaded_files().count(), 1);
}

#[rstest]
fn malformed_extra_file_is_fatal(builder: ConfigBuilder) {
    let files = MemoryFiles::default().with("bad.json", json!([1]));
    let err = builder
        .add_file("bad.json")
        .file_loader(files)
        .build()
        .expect_err("parse error");
    assert!(matches!(*err, ConfigError::Parse { .. }));
}

#[rstest]
fn primary_file_merges_before_extras(builder: ConfigBuilder) {
    let files = MemoryFiles::default()
        .with("extra.json", json!({"who": "extra"}))
        .with("primary.json", json!({"who": "primary"}));
    let config = builder
        .add_file("extra.json")
        .file_path("primary.json")
        .file_loader(files)
        .build()
        .expect("resolves");
    assert_eq!(config.get_as::<String>("who").as_deref(), Some("extra"));
}

#[rstest]
fn namespaced_files_are_nested(builder: ConfigBuilder) {
    let files = MemoryFiles::default()
        .with("chunking.toml", json!({"chunking": {"chunk_size": 2000}}))
        .with("pyproject.toml", json!({"tool": {"lint": {"strict": true}}, "project": {}}));
    let config = builder
        .add_namespaced_file("chunking.toml", "app")
        .add_namespaced_file("pyproject.toml", "lint")
        .file_loader(files)
        .build()
        .expect("resolves");
    assert_eq!(config.get("app.chunking.chunk_size").and_then(Node::as_i64), Some(2000));
    assert_eq!(config.get_as::<bool>("lint.strict"), Some(true));
    assert!(!config.contains("project"));
}

#[rstest]
fn app_prefix_routes_into_namespace(builder: ConfigBuilder) {
    let config = builder
        .app_defaults("semantiscan", json!({"chunking": {"chunk_size": 1000}}))
        .app_prefix("semantiscan", "SEMANTISCAN")
        .env_snapshot(EnvSnapshot::from_iter([
            ("SEMANTISCAN_CHUNKING__CHUNK_SIZE", "3000"),
            ("SEMANTISCAN_NEW_KEY", "x"),
        ]))
        .build()
        .expect("resolves");
    assert_eq!(
        config.get("semantiscan.chunking.chunk_size").and_then(Node::as_i64),
        Some(3000)
    );
    assert_eq!(config.get_as::<String>("semantiscan.new_key").as_deref(), Some("x"));
    assert!(!config.contains("chunking"));
}

#[rstest]
fn overrides_coerce_strings_only(builder: ConfigBuilder) {
    let config = builder
        .overrides([
            ("flags.enabled", json!("false")),
            ("limits.max", json!(123)),
            ("name", json!("plain")),
        ])
        .build()
        .expect("resolves");
    assert_eq!(config.get_as::<bool>("flags.enabled"), Some(false));
    assert_eq!(config.get_as::<i64>("limits.max"), Some(123));
    assert_eq!(config.get_as::<String>("name").as_deref(), Some("plain"));
}

#[rstest]
fn mandatory_failures_are_collected(builder: ConfigBuilder) {
    let err = builder
        .defaults(json!({"a": {"b": 1}, "s": "scalar"}))
        .mandatory(["a.b", "x.y", "s.inner", "z"])
        .build()
        .expect_err("missing keys");
    assert_eq!(err.missing_keys(), ["x.y", "s.inner", "z"]);
}

#[rstest]
#[case::defaults(Config::builder().defaults(json!([1])), "defaults")]
#[case::initial(Config::builder().initial(json!("text")), "initial")]
#[case::app(Config::builder().app_defaults("ns", json!(3)), "app_defaults:ns")]
fn non_mapping_layers_are_rejected(#[case] candidate: ConfigBuilder, #[case] label: &str) {
    let err = candidate
        .load_dotenv_file(false)
        .env_snapshot(EnvSnapshot::new())
        .build()
        .expect_err("invalid layer");
    assert!(matches!(&*err, ConfigError::InvalidLayer { layer, .. } if layer == label));
}

#[rstest]
fn provenance_tracks_every_layer(builder: ConfigBuilder) {
    let files = MemoryFiles::default().with("app.toml", json!({"db": {"host": "file"}}));
    let config = builder
        .defaults(json!({"db": {"host": "default", "port": 1}}))
        .file_path("app.toml")
        .prefix("APP")
        .env_snapshot(EnvSnapshot::from_iter([("APP_DB_HOST", "env")]))
        .override_value("db.host", json!("override"))
        .track_provenance(true)
        .file_loader(files)
        .build()
        .expect("resolves");

    let sources: Vec<_> = config
        .provenance_history("db.host")
        .iter()
        .map(|entry| entry.source.clone())
        .collect();
    assert_eq!(sources, ["defaults", "file:app.toml", "env:APP_*", "overrides_dict"]);
    assert_eq!(config.provenance("db.port").map(|e| e.source.as_str()), Some("defaults"));

    let dump = config.provenance_dump();
    assert_eq!(dump.get("db.host").map(String::as_str), Some("overrides_dict"));
    let summary = config.sources_summary();
    assert_eq!(summary.get("overrides_dict"), Some(&1));
    assert_eq!(summary.get("defaults"), Some(&1));
}

#[rstest]
fn provenance_is_empty_when_disabled(builder: ConfigBuilder) {
    let config = builder.defaults(json!({"a": 1})).build().expect("resolves");
    assert!(config.provenance("a").is_none());
    assert!(config.provenance_history("a").is_empty());
    assert!(config.provenance_dump().is_empty());
    assert!(config.sources_summary().is_empty());
    assert!(config.provenance_ledger().is_none());
}

#[rstest]
fn unset_prefix_ignores_environment(builder: ConfigBuilder) {
    let config = builder
        .env_snapshot(EnvSnapshot::from_iter([("APP_X", "1")]))
        .build()
        .expect("resolves");
    assert!(config.is_empty());
}

#[rstest]
fn resolved_tree_is_mutable(builder: ConfigBuilder) {
    let mut config = builder.defaults(json!({"a": {"b": 1}})).build().expect("resolves");
    config.set("a.c", json!({"d": [ {"e": 1} ]}));
    let nested = config
        .get("a.c.d")
        .and_then(Node::as_sequence)
        .and_then(|items| items.first())
        .and_then(Node::as_tree);
    assert!(nested.is_some());
    assert_eq!(
        Value::Object(config.to_plain_tree()),
        json!({"a": {"b": 1, "c": {"d": [{"e": 1}]}}})
    );
}
