//! Tests for loading and saving configuration files

use hand_tracking_bridge::config::{Config, EXAMPLE_CONFIG};

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::default();
    config.network.host = "192.168.1.20".to_string();
    config.detection.max_num_hands = 1;
    config.display.enabled = false;
    config.to_file(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file() {
    assert!(Config::from_file("/nonexistent/config.yaml").is_err());
}

#[test]
fn test_malformed_yaml() {
    let err = Config::from_yaml("detection: [1, 2").unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_wrong_type_rejected() {
    assert!(Config::from_yaml("network:\n  port: not-a-port\n").is_err());
}

#[test]
fn test_example_config_is_valid_apart_from_models() {
    let config = Config::from_yaml(EXAMPLE_CONFIG).unwrap();
    assert!(config.validate_settings().is_ok());
    assert_eq!(config.capture.window_width, 800);
    assert_eq!(config.capture.window_height, 600);
    assert_eq!(config.network.port, 8055);
}
