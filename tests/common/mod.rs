//! Shared fakes for service and command tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clmsh::config::Settings;
use clmsh::domain::{
    Channel, ContentFilter, CriteriaDefinition, Environment, FilterCriteria, FilterRule, Package,
    Project, ProjectFilter, ProjectSource,
};
use clmsh::infrastructure::di::ServiceContainer;
use clmsh::infrastructure::traits::{ContentApi, Sleeper};
use clmsh::infrastructure::{ApiError, ApiResult};

/// In-memory server that records every mutating call.
#[derive(Default)]
pub struct FakeContentApi {
    pub projects: Vec<Project>,
    pub environments: HashMap<String, Vec<Environment>>,
    pub sources: HashMap<String, Vec<ProjectSource>>,
    pub project_filters: HashMap<String, Vec<ProjectFilter>>,
    pub filters: Vec<ContentFilter>,
    pub criteria: Vec<CriteriaDefinition>,
    pub channels: Vec<Channel>,
    pub packages: HashMap<String, Vec<Package>>,
    /// Build/promote calls fail until this drops to zero.
    pub staging_failures: AtomicU32,
    /// Every read call fails.
    pub offline: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeContentApi {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn read<T: Clone>(&self, method: &str, value: T) -> ApiResult<T> {
        if self.offline {
            return Err(ApiError::remote(method, "connection refused"));
        }
        Ok(value)
    }

    fn staging_call(&self, call: String) -> ApiResult<()> {
        self.record(call.clone());
        let left = self.staging_failures.load(Ordering::SeqCst);
        if left > 0 {
            self.staging_failures.store(left - 1, Ordering::SeqCst);
            return Err(ApiError::remote(call, "another build is in progress"));
        }
        Ok(())
    }
}

impl ContentApi for FakeContentApi {
    fn list_projects(&self) -> ApiResult<Vec<Project>> {
        self.read("listProjects", self.projects.clone())
    }

    fn lookup_project(&self, project: &str) -> ApiResult<Project> {
        self.projects
            .iter()
            .find(|p| p.label == project)
            .cloned()
            .ok_or_else(|| ApiError::remote("lookupProject", format!("no project {project}")))
    }

    fn list_project_environments(&self, project: &str) -> ApiResult<Vec<Environment>> {
        self.read(
            "listProjectEnvironments",
            self.environments.get(project).cloned().unwrap_or_default(),
        )
    }

    fn list_project_sources(&self, project: &str) -> ApiResult<Vec<ProjectSource>> {
        self.read(
            "listProjectSources",
            self.sources.get(project).cloned().unwrap_or_default(),
        )
    }

    fn list_project_filters(&self, project: &str) -> ApiResult<Vec<ProjectFilter>> {
        self.read(
            "listProjectFilters",
            self.project_filters.get(project).cloned().unwrap_or_default(),
        )
    }

    fn list_filters(&self) -> ApiResult<Vec<ContentFilter>> {
        self.read("listFilters", self.filters.clone())
    }

    fn list_filter_criteria(&self) -> ApiResult<Vec<CriteriaDefinition>> {
        self.read("listFilterCriteria", self.criteria.clone())
    }

    fn build_project(&self, project: &str) -> ApiResult<()> {
        self.staging_call(format!("build {project}"))
    }

    fn promote_project(&self, project: &str, env: &str) -> ApiResult<()> {
        self.staging_call(format!("promote {project} {env}"))
    }

    fn create_project(&self, label: &str, name: &str, description: &str) -> ApiResult<()> {
        self.record(format!("create_project {label}|{name}|{description}"));
        Ok(())
    }

    fn attach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()> {
        self.record(format!("attach_source {project} {source_type} {source}"));
        Ok(())
    }

    fn detach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()> {
        self.record(format!("detach_source {project} {source_type} {source}"));
        Ok(())
    }

    fn create_environment(
        &self,
        project: &str,
        predecessor: &str,
        label: &str,
        name: &str,
        description: &str,
    ) -> ApiResult<()> {
        self.record(format!(
            "create_environment {project} [{predecessor}] {label}|{name}|{description}"
        ));
        Ok(())
    }

    fn remove_environment(&self, project: &str, env: &str) -> ApiResult<()> {
        self.record(format!("remove_environment {project} {env}"));
        Ok(())
    }

    fn create_filter(
        &self,
        name: &str,
        rule: FilterRule,
        entity_type: &str,
        criteria: &FilterCriteria,
    ) -> ApiResult<()> {
        self.record(format!(
            "create_filter {name} {rule} {entity_type} {} {} {}",
            criteria.field, criteria.matcher, criteria.value
        ));
        Ok(())
    }

    fn attach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()> {
        self.record(format!("attach_filter {project} {filter_id}"));
        Ok(())
    }

    fn detach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()> {
        self.record(format!("detach_filter {project} {filter_id}"));
        Ok(())
    }

    fn create_appstream_filters(
        &self,
        prefix: &str,
        channel: &str,
        project: &str,
    ) -> ApiResult<()> {
        self.record(format!("create_appstream_filters {prefix} {channel} {project}"));
        Ok(())
    }

    fn list_software_channels(&self) -> ApiResult<Vec<Channel>> {
        self.read("listSoftwareChannels", self.channels.clone())
    }

    fn list_channel_packages(&self, channel: &str) -> ApiResult<Vec<Package>> {
        self.packages
            .get(channel)
            .cloned()
            .ok_or_else(|| ApiError::remote("listAllPackages", format!("no channel {channel}")))
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: Mutex<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

pub fn container(api: Arc<FakeContentApi>) -> ServiceContainer {
    ServiceContainer::with_deps(
        Settings::default(),
        api,
        Arc::new(RecordingSleeper::default()),
    )
}

// ============================================================
// fixtures
// ============================================================

pub fn project(label: &str) -> Project {
    Project {
        label: label.to_string(),
        name: label.to_uppercase(),
        description: format!("{label} project"),
        first_environment: None,
        last_build_date: None,
    }
}

pub fn env(label: &str) -> Environment {
    Environment {
        label: label.to_string(),
        name: label.to_string(),
        description: String::new(),
        status: "built".to_string(),
        version: 1,
        last_build_date: None,
    }
}

pub fn envs(labels: &[&str]) -> Vec<Environment> {
    labels.iter().map(|l| env(l)).collect()
}

pub fn source(channel: &str) -> ProjectSource {
    ProjectSource {
        channel_label: channel.to_string(),
        source_type: Some("software".to_string()),
        state: Some("ATTACHED".to_string()),
    }
}

pub fn filter(id: i64, name: &str) -> ContentFilter {
    ContentFilter {
        id,
        name: name.to_string(),
        entity_type: "package".to_string(),
        rule: "deny".to_string(),
        criteria: FilterCriteria {
            field: "name".to_string(),
            matcher: "contains".to_string(),
            value: name.to_string(),
        },
    }
}

pub fn attached(f: ContentFilter) -> ProjectFilter {
    ProjectFilter {
        filter: f,
        state: Some("ATTACHED".to_string()),
    }
}

pub fn criterion(entity_type: &str, field: &str, matcher: &str) -> CriteriaDefinition {
    CriteriaDefinition {
        entity_type: entity_type.to_string(),
        field: field.to_string(),
        matcher: matcher.to_string(),
    }
}

pub fn channel(label: &str, parent: Option<&str>) -> Channel {
    Channel {
        label: label.to_string(),
        parent_label: parent.map(String::from),
    }
}

pub fn package(name: &str, version: &str) -> Package {
    Package {
        name: name.to_string(),
        version: version.to_string(),
        release: "1".to_string(),
        epoch: None,
        arch_label: "x86_64".to_string(),
    }
}
