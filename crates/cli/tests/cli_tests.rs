//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "stm-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("PROPERTY_URI"),
        "Should show the property argument"
    );
    assert!(
        stdout.contains("trailing slash"),
        "Should explain the property URI convention"
    );
    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("--verbose"), "Should show verbose option");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "stm-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("stm"), "Should show binary name");
}

/// Test that the property URI is required
#[test]
fn test_property_uri_is_required() {
    let output = Command::new("cargo")
        .args(["run", "-p", "stm-cli", "--"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing property should fail");
    assert!(
        stderr.contains("PROPERTY_URI"),
        "Should name the missing argument"
    );
}

/// Test that a property URI without the trailing slash is rejected
#[test]
fn test_rejects_property_uri_without_trailing_slash() {
    let output = Command::new("cargo")
        .args(["run", "-p", "stm-cli", "--", "https://example.com"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Bad property URI should fail");
    assert!(
        stderr.contains("trailing slash"),
        "Should explain the rejection"
    );
}
