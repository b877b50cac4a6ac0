//! Text layout of command results.
//!
//! Pure functions returning lines; printing happens in `commands`.

use crate::application::services::{CriteriaGroup, EnvironmentStatus, ProjectDetails};
use crate::domain::{display_build_time, ContentFilter};

pub fn criteria(groups: &[CriteriaGroup]) -> Vec<String> {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(String::new());
        lines.push(format!("Type {}:", group.entity_type));
        lines.push("-".repeat(13));
        lines.push(format!("  {:30}{:30}", "[matcher]", "[field]"));
        for c in &group.criteria {
            lines.push(format!("  {:30}{:30}", c.matcher, c.field));
        }
    }
    lines
}

pub fn project_details(details: &ProjectDetails) -> Vec<String> {
    let p = &details.project;
    let last_build = display_build_time(p.last_build_date.as_deref());

    let mut lines = vec![
        "Project details:".to_string(),
        "-".repeat(16),
        format!("Name:          {}", p.name),
        format!("Label:         {}", p.label),
        format!("Description:   {}", p.description),
        format!(
            "First Env:     {}",
            p.first_environment.as_deref().unwrap_or_default()
        ),
        format!("Last Build:    {}", last_build),
        String::new(),
        "Sources:".to_string(),
        "-".repeat(9),
    ];
    for (label, is_base) in &details.sources {
        if *is_base {
            lines.push(label.clone());
        } else {
            lines.push(format!("  |-- {label}"));
        }
    }

    lines.push(String::new());
    lines.push("Filters:".to_string());
    lines.push("-".repeat(9));
    lines.extend(details.filters.iter().map(|f| format!("- {f}")));

    lines.push(String::new());
    lines.push("Environments:".to_string());
    lines.push("-".repeat(14));
    lines.extend(details.environments.iter().map(|e| format!("- {e}")));
    lines
}

pub fn filter_list(filters: &[ContentFilter]) -> Vec<String> {
    let mut lines = vec!["Filterlist:".to_string(), "-".repeat(11)];
    if filters.is_empty() {
        lines.push("No filters configured".to_string());
        return lines;
    }
    lines.push(filter_row(
        "[name]", "[type]", "[rule]", "[field]", "[matcher]", "[value]",
    ));
    for f in filters {
        lines.push(filter_row(
            &f.name,
            &f.entity_type,
            &f.rule,
            &f.criteria.field,
            &f.criteria.matcher,
            &f.criteria.value,
        ));
    }
    lines
}

fn filter_row(
    name: &str,
    entity_type: &str,
    rule: &str,
    field: &str,
    matcher: &str,
    value: &str,
) -> String {
    format!("  {name:30}{entity_type:15}{rule:10}{field:30}{matcher:30}{value:30}")
}

/// Status table, or comma separated lines when `quiet`.
pub fn environment_status(rows: &[EnvironmentStatus], quiet: bool) -> Vec<String> {
    if quiet {
        return rows
            .iter()
            .map(|r| format!("{},{},{},{}", r.label, r.status, r.version, r.build_time))
            .collect();
    }

    let mut lines = vec![
        format!(
            "{:30}{:15}{:9} {:19} ",
            "[label]", "[status]", "[version]", "[buildtime]"
        ),
        "-".repeat(74),
    ];
    for r in rows {
        lines.push(format!(
            "{:30}{:15}{:9} {:19} ",
            r.label, r.status, r.version, r.build_time
        ));
    }
    lines
}

pub fn env_diff(diff: &[String]) -> Vec<String> {
    let mut lines = vec![String::new()];
    if diff.is_empty() {
        lines.push("No differences found".to_string());
    } else {
        lines.push("Differences found:".to_string());
        lines.extend(diff.iter().cloned());
    }
    lines
}
