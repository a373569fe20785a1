//! Tests for ClientConfig loading and overrides.

use std::fs;
use std::time::Duration;

use tempfile::TempDir;

use chess_client::{ClientConfig, ClientErrorKind, PlayerAssignment, ENV_AUTO_RESPOND, ENV_PLAYER, ENV_SERVER_URL};

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.server_url(), "http://127.0.0.1:5100");
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert!(!*config.auto_respond());
    assert_eq!(*config.player(), PlayerAssignment::Both);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("chess.toml");
    fs::write(&path, "player = \"black\"\nauto_respond = true\n").expect("Failed to write TOML");

    let config = ClientConfig::from_file(&path).expect("Load failed");
    assert_eq!(*config.player(), PlayerAssignment::Black);
    assert!(*config.auto_respond());
    assert_eq!(config.server_url(), "http://127.0.0.1:5100");
    assert_eq!(*config.poll_interval_ms(), 1000);
}

#[test]
fn test_full_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("chess.toml");
    fs::write(
        &path,
        r#"server_url = "http://chess.local:8080"
poll_interval_ms = 250
request_timeout_ms = 3000
auto_respond = false
player = "white"
"#,
    )
    .expect("Failed to write TOML");

    let config = ClientConfig::from_file(&path).expect("Load failed");
    assert_eq!(config.server_url(), "http://chess.local:8080");
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
    assert_eq!(config.request_timeout(), Duration::from_secs(3));
    assert_eq!(*config.player(), PlayerAssignment::White);
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("chess.toml");
    fs::write(&path, "this is not valid toml !!!@@@").expect("Write failed");

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(matches!(err.kind, ClientErrorKind::Config(ref m) if m.starts_with("Failed to parse config")));
}

#[test]
fn test_zero_interval_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("chess.toml");
    fs::write(&path, "poll_interval_ms = 0\n").expect("Write failed");

    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(err.user_message().contains("poll_interval_ms"));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let config = ClientConfig::load_or_default(dir.path().join("absent.toml")).expect("Load failed");
    assert_eq!(config, ClientConfig::default());
    assert!(ClientConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_builder_overrides() {
    let config = ClientConfig::default()
        .with_server_url("http://10.0.0.2:5100")
        .with_player(PlayerAssignment::White)
        .with_auto_respond(true)
        .with_poll_interval_ms(500)
        .with_request_timeout_ms(2000);
    assert_eq!(config.server_url(), "http://10.0.0.2:5100");
    assert_eq!(*config.player(), PlayerAssignment::White);
    assert!(*config.auto_respond());
    assert_eq!(config.poll_interval(), Duration::from_millis(500));
    assert_eq!(config.request_timeout(), Duration::from_secs(2));
}

// The only test in this binary that touches the process environment.
#[test]
fn test_environment_overrides() {
    unsafe {
        std::env::set_var(ENV_SERVER_URL, "http://env.example:9000");
        std::env::set_var(ENV_PLAYER, "BLACK");
        std::env::set_var(ENV_AUTO_RESPOND, "yes");
    }
    let mut config = ClientConfig::default();
    config.apply_env().expect("Overrides failed");
    assert_eq!(config.server_url(), "http://env.example:9000");
    assert_eq!(*config.player(), PlayerAssignment::Black);
    assert!(*config.auto_respond());

    unsafe {
        std::env::set_var(ENV_PLAYER, "purple");
    }
    let err = ClientConfig::default().apply_env().unwrap_err();
    assert!(err.user_message().contains(ENV_PLAYER));

    unsafe {
        std::env::set_var(ENV_PLAYER, "white");
        std::env::set_var(ENV_AUTO_RESPOND, "maybe");
    }
    let err = ClientConfig::default().apply_env().unwrap_err();
    assert!(err.user_message().contains(ENV_AUTO_RESPOND));

    unsafe {
        std::env::remove_var(ENV_SERVER_URL);
        std::env::remove_var(ENV_PLAYER);
        std::env::remove_var(ENV_AUTO_RESPOND);
    }
}
