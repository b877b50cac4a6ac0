//! Domain entities: content lifecycle objects as returned by the server

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Source type used when none is given on the command line.
pub const DEFAULT_SOURCE_TYPE: &str = "software";

/// A content lifecycle project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub label: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub first_environment: Option<String>,
    #[serde(default)]
    pub last_build_date: Option<String>,
}

/// One stage of a project's promotion pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub label: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub last_build_date: Option<String>,
}

/// A channel attached to a project as content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSource {
    pub channel_label: String,
    #[serde(default, rename = "type")]
    pub source_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Filter attachment of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub filter: ContentFilter,
    #[serde(default)]
    pub state: Option<String>,
}

/// A content filter definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilter {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub criteria: FilterCriteria,
}

/// Match criteria of a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub matcher: String,
    #[serde(default)]
    pub value: String,
}

/// A supported (entity type, field, matcher) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaDefinition {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub field: String,
    pub matcher: String,
}

/// Software channel, as far as lifecycle commands care.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub label: String,
    #[serde(default)]
    pub parent_label: Option<String>,
}

impl Channel {
    /// Base channels have no parent.
    pub fn is_base(&self) -> bool {
        self.parent_label.as_deref().map_or(true, str::is_empty)
    }
}

/// Package entry of a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub version: String,
    pub release: String,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub arch_label: String,
}

impl Package {
    /// `name-[epoch:]version-release.arch`
    pub fn nevra(&self) -> String {
        let epoch = match self.epoch.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() && e != "0" => format!("{e}:"),
            _ => String::new(),
        };
        let mut s = format!("{}-{}{}-{}", self.name, epoch, self.version, self.release);
        if !self.arch_label.is_empty() {
            s.push('.');
            s.push_str(&self.arch_label);
        }
        s
    }
}

/// Whether a filter admits or excludes matching content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRule {
    Allow,
    Deny,
}

impl FilterRule {
    pub const ALL: [FilterRule; 2] = [FilterRule::Allow, FilterRule::Deny];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterRule::Allow => "allow",
            FilterRule::Deny => "deny",
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterRule {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(FilterRule::Allow),
            "deny" => Ok(FilterRule::Deny),
            _ => Err(DomainError::InvalidFilterRule(s.to_string())),
        }
    }
}

/// Parse a server timestamp.
///
/// Accepts RFC 3339, the XML-RPC `YYYYMMDDTHH:MM:SS` form and plain
/// `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DomainError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    for fmt in ["%Y%m%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    Err(DomainError::InvalidTimestamp(raw.to_string()))
}

/// Render an optional build timestamp; never-built stages show `-`.
pub fn format_build_time(raw: Option<&str>) -> Result<String, DomainError> {
    match raw {
        Some(s) if !s.trim().is_empty() => {
            Ok(parse_timestamp(s)?.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        _ => Ok("-".to_string()),
    }
}

/// Build time for display: `-` when never built, the raw text when unparsable.
pub fn display_build_time(raw: Option<&str>) -> String {
    format_build_time(raw).unwrap_or_else(|_| raw.unwrap_or_default().to_string())
}

/// Expand environment variables and `~` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
