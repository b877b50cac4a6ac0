//! Environment overrides for Settings.
//!
//! Kept in its own test binary: the variables set here are process-wide.

use std::fs;

use tempfile::TempDir;

use clmsh::config::Settings;

#[test]
fn given_env_vars_when_load_then_override_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clmsh.toml");
    fs::write(
        &path,
        "server = \"from-file\"\n[staging]\nmax_attempts = 5\n",
    )
    .unwrap();
    std::env::set_var("CLMSH_SERVER", "from-env");
    std::env::set_var("CLMSH_STAGING__MAX_ATTEMPTS", "9");

    let settings = Settings::load(Some(&path)).expect("load settings");

    std::env::remove_var("CLMSH_SERVER");
    std::env::remove_var("CLMSH_STAGING__MAX_ATTEMPTS");
    assert_eq!(settings.server, "from-env");
    assert_eq!(settings.staging.max_attempts, 9);
}
