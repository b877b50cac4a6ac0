//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `$XDG_CONFIG_HOME/clmsh/clmsh.toml`, or the file passed with `--config`
//! 3. Environment variables: `CLMSH_*` prefix
//! 4. Command-line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Path of the server's API root.
pub const API_PATH: &str = "/rhn/manager/api";

/// Retry settings for the staging pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StagingConfig {
    /// Attempts per build/promote step before giving up
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub retry_interval_secs: u64,
    /// Upper bound for the doubling delay
    pub max_interval_secs: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            retry_interval_secs: 5,
            max_interval_secs: 60,
        }
    }
}

/// Raw staging config for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStagingConfig {
    pub max_attempts: Option<u32>,
    pub retry_interval_secs: Option<u64>,
    pub max_interval_secs: Option<u64>,
}

impl StagingConfig {
    /// Overlay wins where it specifies a value.
    pub fn merge(&self, overlay: &RawStagingConfig) -> Self {
        Self {
            max_attempts: overlay.max_attempts.unwrap_or(self.max_attempts),
            retry_interval_secs: overlay
                .retry_interval_secs
                .unwrap_or(self.retry_interval_secs),
            max_interval_secs: overlay.max_interval_secs.unwrap_or(self.max_interval_secs),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub server: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub nossl: Option<bool>,
    pub quiet: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub history_file: Option<PathBuf>,
    #[serde(default)]
    pub staging: RawStagingConfig,
}

/// Unified configuration for clmsh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Server host name, or a full origin such as `http://127.0.0.1:8080`
    pub server: String,
    /// Login name (prompted for when empty)
    pub username: String,
    /// Password (prompted for when unset)
    pub password: Option<String>,
    /// Talk plain HTTP instead of HTTPS
    pub nossl: bool,
    /// Terse, machine-readable output where supported
    pub quiet: bool,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Interactive shell history
    pub history_file: PathBuf,
    /// Staging pipeline retry settings
    pub staging: StagingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: "localhost".into(),
            username: String::new(),
            password: None,
            nossl: false,
            quiet: false,
            timeout_secs: 300,
            history_file: default_history_file(),
            staging: StagingConfig::default(),
        }
    }
}

fn default_history_file() -> PathBuf {
    ProjectDirs::from("", "", "clmsh")
        .map(|dirs| dirs.data_dir().join("history"))
        .unwrap_or_else(|| PathBuf::from("~/.clmsh_history"))
}

/// Get the XDG config directory for clmsh.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clmsh").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("clmsh.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// API root URL derived from `server` and `nossl`.
    pub fn api_url(&self) -> String {
        let server = self.server.trim().trim_end_matches('/');
        if server.contains("://") {
            format!("{server}{API_PATH}")
        } else {
            let scheme = if self.nossl { "http" } else { "https" };
            format!("{scheme}://{server}{API_PATH}")
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.history_file.to_string_lossy().as_ref());
        self.history_file = PathBuf::from(expanded);
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            server: overlay.server.clone().unwrap_or_else(|| self.server.clone()),
            username: overlay
                .username
                .clone()
                .unwrap_or_else(|| self.username.clone()),
            password: overlay.password.clone().or_else(|| self.password.clone()),
            nossl: overlay.nossl.unwrap_or(self.nossl),
            quiet: overlay.quiet.unwrap_or(self.quiet),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            history_file: overlay
                .history_file
                .clone()
                .unwrap_or_else(|| self.history_file.clone()),
            staging: self.staging.merge(&overlay.staging),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Explicit config file; must exist when given. Without
    ///   it the global config file is used if present.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply CLMSH_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CLMSH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("server") {
            settings.server = val;
        }
        if let Ok(val) = config.get_string("username") {
            settings.username = val;
        }
        if let Ok(val) = config.get_string("password") {
            settings.password = Some(val);
        }
        if let Ok(val) = config.get_bool("nossl") {
            settings.nossl = val;
        }
        if let Ok(val) = config.get_bool("quiet") {
            settings.quiet = val;
        }
        if let Ok(val) = config.get::<u64>("timeout_secs") {
            settings.timeout_secs = val;
        }
        if let Ok(val) = config.get_string("history_file") {
            settings.history_file = PathBuf::from(val);
        }
        if let Ok(val) = config.get::<u32>("staging.max_attempts") {
            settings.staging.max_attempts = val;
        }
        if let Ok(val) = config.get::<u64>("staging.retry_interval_secs") {
            settings.staging.retry_interval_secs = val;
        }
        if let Ok(val) = config.get::<u64>("staging.max_interval_secs") {
            settings.staging.max_interval_secs = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML, password masked.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let mut shown = self.clone();
        if shown.password.is_some() {
            shown.password = Some("********".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# clmsh configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/clmsh/clmsh.toml  (or --config <file>)
#   Env:  CLMSH_* environment variables (CLMSH_STAGING__MAX_ATTEMPTS for nested keys)
#   CLI:  --server, --username, --password, --nossl, --quiet

# Server host name, or a full origin like "http://127.0.0.1:8080"
# server = "suma.example.com"

# Login name; prompted for when empty
# username = "admin"

# Password; prompted for when unset. Prefer the prompt or CLMSH_PASSWORD.
# password = "secret"

# Use plain HTTP
# nossl = false

# Terse output (clm_projectstatus prints comma separated lines)
# quiet = false

# Per-request timeout in seconds
# timeout_secs = 300

# Interactive shell history
# history_file = "~/.local/share/clmsh/history"

[staging]
# Attempts per build/promote step in clm_projectstagingfull
# max_attempts = 60

# First retry delay in seconds; doubles per attempt up to max_interval_secs
# retry_interval_secs = 5
# max_interval_secs = 60
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_defaults_when_building_api_url_then_https_localhost() {
        let settings = Settings::default();
        assert_eq!(settings.api_url(), "https://localhost/rhn/manager/api");
    }

    #[test]
    fn given_nossl_when_building_api_url_then_http() {
        let settings = Settings {
            server: "suma.example.com".into(),
            nossl: true,
            ..Settings::default()
        };
        assert_eq!(settings.api_url(), "http://suma.example.com/rhn/manager/api");
    }

    #[test]
    fn given_full_origin_when_building_api_url_then_used_verbatim() {
        let settings = Settings {
            server: "http://127.0.0.1:8080/".into(),
            ..Settings::default()
        };
        assert_eq!(settings.api_url(), "http://127.0.0.1:8080/rhn/manager/api");
    }

    #[test]
    fn given_tilde_in_history_file_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            history_file: PathBuf::from("~/.clmsh_history"),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        let shown = settings.history_file.to_string_lossy();
        assert!(shown.starts_with(&home), "should start with home: {shown}");
        assert!(!shown.contains('~'));
    }

    #[test]
    fn given_partial_overlay_when_merging_then_keeps_base_values() {
        let base = Settings::default();
        let overlay = RawSettings {
            server: Some("suma".into()),
            staging: RawStagingConfig {
                max_attempts: Some(3),
                ..RawStagingConfig::default()
            },
            ..RawSettings::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.server, "suma");
        assert_eq!(result.username, base.username);
        assert_eq!(result.timeout_secs, 300);
        assert_eq!(result.staging.max_attempts, 3);
        assert_eq!(result.staging.retry_interval_secs, 5);
    }

    #[test]
    fn given_password_when_showing_toml_then_masked() {
        let settings = Settings {
            password: Some("hunter2".into()),
            ..Settings::default()
        };
        let shown = settings.to_toml().unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("********"));
    }

    #[test]
    fn given_template_when_parsing_then_valid_toml() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.server.is_none());
    }
}
