//! Tests for command-line argument parsing
//!
//! These run the built binary with arguments that exit before any camera or
//! model is opened.

use hand_tracking_bridge::config::Config;
use std::process::Command;

fn bridge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hand-tracking-bridge"))
}

#[test]
fn test_help_argument() {
    let output = bridge().arg("--help").output().unwrap();
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--video",
        "--cam",
        "--config",
        "--host",
        "--port",
        "--width",
        "--height",
        "--max-hands",
        "--no-gui",
        "--debug",
        "--write-config",
    ] {
        assert!(help.contains(flag), "Help should mention {flag}");
    }
    assert!(help.contains("[MODE]"));
}

#[test]
fn test_write_config_produces_default_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bridge.yaml");

    let status = bridge().arg("--write-config").arg(&path).status().unwrap();
    assert!(status.success());

    let written = Config::from_file(&path).unwrap();
    assert_eq!(written, Config::default());
}

#[test]
fn test_invalid_port_rejected() {
    let output = bridge().args(["--port", "70000"]).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_unknown_flag_rejected() {
    let output = bridge().arg("--no-such-flag").output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_invalid_configuration_fails_before_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "detection:\n  max_num_hands: 0\n").unwrap();

    let output = bridge()
        .args(["video", "--no-gui", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid configuration"));
}
