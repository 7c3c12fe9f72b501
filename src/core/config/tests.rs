use super::data::{path_display, Config};
use super::io::{write_atomically, ConfigError};
use super::orchestrator::ConfigOrchestrator;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_orchestrator_detects_external_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    orchestrator
        .mutate(|config| {
            config.last_model = Some("llama2".to_string());
            Ok(())
        })
        .expect("mutate failed");

    let persisted = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.last_model.as_deref(), Some("llama2"));

    let cached = orchestrator.load_with_cache().expect("cached load failed");
    assert_eq!(cached.last_model.as_deref(), Some("llama2"));

    std::thread::sleep(Duration::from_millis(1100));

    let external = Config {
        last_model: Some("mistral".to_string()),
        ..Default::default()
    };
    external
        .save_to_path(&config_path)
        .expect("external save failed");

    let reloaded = orchestrator.load_with_cache().expect("reload failed");
    assert_eq!(reloaded.last_model.as_deref(), Some("mistral"));
}

#[test]
fn load_nonexistent_config_yields_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert!(config.markdown_enabled());
}

#[test]
fn config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        last_model: Some("llama2".to_string()),
        markdown: Some(false),
        sessions_file: Some(PathBuf::from("/tmp/sessions.json")),
    };
    config.save_to_path(&config_path).expect("save failed");

    let loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded, config);
    assert!(!loaded.markdown_enabled());
    assert_eq!(
        loaded.sessions_path(),
        Some(PathBuf::from("/tmp/sessions.json"))
    );

    let cleared = Config {
        last_model: None,
        ..loaded
    };
    cleared.save_to_path(&config_path).expect("second save failed");
    let reloaded = Config::load_from_path(&config_path).expect("reload failed");
    assert_eq!(reloaded.last_model, None);
}

#[test]
fn invalid_toml_reports_parse_error_with_path() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "last_model = [").expect("write failed");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse config at"));
}

#[test]
fn write_atomically_replaces_existing_contents() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("file.json");
    write_atomically(&path, b"first").expect("first write");
    write_atomically(&path, b"second").expect("second write");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "second");

    let leftovers = std::fs::read_dir(temp_dir.path()).expect("list").count();
    assert_eq!(leftovers, 1);
}

#[test]
fn test_override_routes_mutate_to_temp_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    Config::set_test_config_path(config_path.clone());

    Config::mutate(|config| {
        config.markdown = Some(false);
        Ok(())
    })
    .expect("mutate failed");
    let loaded = Config::load().expect("load failed");
    assert_eq!(Config::config_path(), config_path);

    Config::clear_test_config_override();
    assert_eq!(loaded.markdown, Some(false));
}

#[cfg(unix)]
#[test]
fn path_display_abbreviates_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("llm-chat");
        assert_eq!(path_display(&path), "~/.config/llm-chat");
    }
    assert_eq!(path_display("/definitely/not/home"), "/definitely/not/home");
}
