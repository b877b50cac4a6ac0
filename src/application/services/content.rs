//! Content lifecycle service
//!
//! One method per shell command. Methods return data for the CLI layer to
//! render; multi-call commands report progress through callbacks so output
//! keeps pace with the remote calls.

use std::collections::HashSet;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    display_build_time, filter_candidates, package_diff, ArgKind, CompletionRequest,
    ContentFilter, CriteriaDefinition, DomainError, Environment, FilterCriteria, FilterRule,
    Project, ProjectFilter, ProjectSource,
};
use crate::infrastructure::traits::ContentApi;

/// Everything `clm_projectdetails` shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDetails {
    pub project: Project,
    /// Source channel labels with a flag telling whether they are base channels
    pub sources: Vec<(String, bool)>,
    pub filters: Vec<String>,
    pub environments: Vec<String>,
}

/// One row of `clm_projectstatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentStatus {
    pub label: String,
    pub status: String,
    pub version: i64,
    pub build_time: String,
}

/// Criteria grouped by entity type, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriteriaGroup {
    pub entity_type: String,
    pub criteria: Vec<CriteriaDefinition>,
}

/// Arguments of `clm_filtercreate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFilter {
    pub name: String,
    pub rule: String,
    pub entity_type: String,
    pub field: String,
    pub matcher: String,
    pub value: String,
}

/// Service for content lifecycle projects, environments, sources and filters.
pub struct ContentService {
    api: Arc<dyn ContentApi>,
}

impl ContentService {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self { api }
    }

    pub fn list_projects(&self) -> ApplicationResult<Vec<Project>> {
        Ok(self.api.list_projects()?)
    }

    pub fn list_environments(&self, project: &str) -> ApplicationResult<Vec<Environment>> {
        Ok(self.api.list_project_environments(project)?)
    }

    pub fn list_sources(&self, project: &str) -> ApplicationResult<Vec<ProjectSource>> {
        Ok(self.api.list_project_sources(project)?)
    }

    pub fn list_project_filters(&self, project: &str) -> ApplicationResult<Vec<ProjectFilter>> {
        Ok(self.api.list_project_filters(project)?)
    }

    pub fn list_filters(&self) -> ApplicationResult<Vec<ContentFilter>> {
        Ok(self.api.list_filters()?)
    }

    /// Filter criteria grouped by entity type.
    pub fn filter_criteria(&self) -> ApplicationResult<Vec<CriteriaGroup>> {
        let all = self.api.list_filter_criteria()?;
        let groups = all
            .iter()
            .map(|c| c.entity_type.clone())
            .unique()
            .map(|entity_type| CriteriaGroup {
                criteria: all
                    .iter()
                    .filter(|c| c.entity_type == entity_type)
                    .cloned()
                    .collect(),
                entity_type,
            })
            .collect();
        Ok(groups)
    }

    #[instrument(skip(self))]
    pub fn project_details(&self, project: &str) -> ApplicationResult<ProjectDetails> {
        let details = self.api.lookup_project(project)?;
        let base_channels: HashSet<String> = self
            .api
            .list_software_channels()?
            .into_iter()
            .filter(|c| c.is_base())
            .map(|c| c.label)
            .collect();
        let sources = self
            .api
            .list_project_sources(project)?
            .into_iter()
            .map(|s| {
                let is_base = base_channels.contains(&s.channel_label);
                (s.channel_label, is_base)
            })
            .collect();
        let filters = self
            .api
            .list_project_filters(project)?
            .into_iter()
            .map(|f| f.filter.name)
            .collect();
        let environments = self
            .api
            .list_project_environments(project)?
            .into_iter()
            .map(|e| e.label)
            .collect();

        Ok(ProjectDetails {
            project: details,
            sources,
            filters,
            environments,
        })
    }

    #[instrument(skip(self))]
    pub fn build(&self, project: &str) -> ApplicationResult<()> {
        Ok(self.api.build_project(project)?)
    }

    #[instrument(skip(self))]
    pub fn promote(&self, project: &str, env: &str) -> ApplicationResult<()> {
        Ok(self.api.promote_project(project, env)?)
    }

    #[instrument(skip(self))]
    pub fn create_project(
        &self,
        label: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<()> {
        Ok(self.api.create_project(label, name, description)?)
    }

    /// Attach each source of a comma separated list, reporting each one before its call.
    #[instrument(skip(self, progress))]
    pub fn attach_sources(
        &self,
        project: &str,
        sources: &str,
        source_type: &str,
        mut progress: impl FnMut(&str),
    ) -> ApplicationResult<Vec<String>> {
        let list = split_sources(sources);
        for source in &list {
            progress(source);
            self.api.attach_source(project, source_type, source)?;
        }
        Ok(list)
    }

    /// Detach each source of a comma separated list, reporting each one before its call.
    #[instrument(skip(self, progress))]
    pub fn detach_sources(
        &self,
        project: &str,
        sources: &str,
        source_type: &str,
        mut progress: impl FnMut(&str),
    ) -> ApplicationResult<Vec<String>> {
        let list = split_sources(sources);
        for source in &list {
            progress(source);
            self.api.detach_source(project, source_type, source)?;
        }
        Ok(list)
    }

    /// Append an environment after the current last stage.
    ///
    /// Returns the predecessor label (empty for the first stage).
    #[instrument(skip(self))]
    pub fn add_environment(
        &self,
        project: &str,
        label: &str,
        name: &str,
        description: &str,
    ) -> ApplicationResult<String> {
        let predecessor = self
            .api
            .list_project_environments(project)?
            .last()
            .map(|e| e.label.clone())
            .unwrap_or_default();
        debug!("add_environment: predecessor={:?}", predecessor);
        self.api
            .create_environment(project, &predecessor, label, name, description)?;
        Ok(predecessor)
    }

    #[instrument(skip(self))]
    pub fn remove_environment(&self, project: &str, env: &str) -> ApplicationResult<()> {
        Ok(self.api.remove_environment(project, env)?)
    }

    #[instrument(skip(self))]
    pub fn create_filter(&self, filter: &NewFilter) -> ApplicationResult<()> {
        let rule: FilterRule = filter.rule.parse()?;
        let criteria = FilterCriteria {
            field: filter.field.clone(),
            matcher: filter.matcher.clone(),
            value: filter.value.clone(),
        };
        Ok(self
            .api
            .create_filter(&filter.name, rule, &filter.entity_type, &criteria)?)
    }

    /// Attach a filter by name. Returns the resolved filter id.
    #[instrument(skip(self))]
    pub fn attach_filter(&self, project: &str, filter_name: &str) -> ApplicationResult<i64> {
        let id = self
            .api
            .list_filters()?
            .into_iter()
            .find(|f| f.name == filter_name)
            .map(|f| f.id)
            .ok_or_else(|| DomainError::FilterNotFound {
                name: filter_name.to_string(),
            })?;
        self.api.attach_filter(project, id)?;
        Ok(id)
    }

    /// Detach a filter by name from the project's filters. Returns the filter id.
    #[instrument(skip(self))]
    pub fn detach_filter(&self, project: &str, filter_name: &str) -> ApplicationResult<i64> {
        let id = self
            .api
            .list_project_filters(project)?
            .into_iter()
            .find(|f| f.filter.name == filter_name)
            .map(|f| f.filter.id)
            .ok_or_else(|| DomainError::FilterNotAttached {
                project: project.to_string(),
                name: filter_name.to_string(),
            })?;
        self.api.detach_filter(project, id)?;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub fn create_appstream_filters(
        &self,
        project: &str,
        channel: &str,
        prefix: &str,
    ) -> ApplicationResult<()> {
        Ok(self.api.create_appstream_filters(prefix, channel, project)?)
    }

    pub fn environment_status(&self, project: &str) -> ApplicationResult<Vec<EnvironmentStatus>> {
        Ok(self
            .api
            .list_project_environments(project)?
            .into_iter()
            .map(|e| EnvironmentStatus {
                build_time: display_build_time(e.last_build_date.as_deref()),
                label: e.label,
                status: e.status,
                version: e.version,
            })
            .collect())
    }

    /// Compare the package lists of two environments channel by channel.
    ///
    /// `progress` receives `(source_channel, target_channel)` before each
    /// comparison. Returns the combined `-`/`+` lines.
    #[instrument(skip(self, progress))]
    pub fn env_diff(
        &self,
        project: &str,
        env1: &str,
        env2: &str,
        mut progress: impl FnMut(&str, &str),
    ) -> ApplicationResult<Vec<String>> {
        if !self.api.list_projects()?.iter().any(|p| p.label == project) {
            return Err(DomainError::ProjectNotFound(project.to_string()).into());
        }

        let channels: HashSet<String> = self
            .api
            .list_software_channels()?
            .into_iter()
            .map(|c| c.label)
            .collect();

        let mut lines = Vec::new();
        for source in self.api.list_project_sources(project)? {
            let src = format!("{}-{}-{}", project, env1, source.channel_label);
            let dst = format!("{}-{}-{}", project, env2, source.channel_label);
            progress(&src, &dst);

            for channel in [&src, &dst] {
                if !channels.contains(channel) {
                    return Err(DomainError::ChannelNotFound(channel.clone()).into());
                }
            }

            let src_pkgs = self.package_names(&src)?;
            let dst_pkgs = self.package_names(&dst)?;
            lines.extend(package_diff(&src_pkgs, &dst_pkgs));
        }
        Ok(lines)
    }

    fn package_names(&self, channel: &str) -> ApplicationResult<Vec<String>> {
        Ok(self
            .api
            .list_channel_packages(channel)?
            .iter()
            .map(|p| p.nevra())
            .collect())
    }

    /// Candidates for a completion request. Remote failures give no candidates.
    ///
    /// Environments keep pipeline order, everything else is sorted.
    pub fn complete(&self, req: &CompletionRequest) -> Vec<String> {
        match self.candidates(req) {
            Ok(all) => {
                let mut out = filter_candidates(all, &req.prefix);
                if !matches!(req.kind, ArgKind::Environment { .. }) {
                    out.sort();
                }
                out
            }
            Err(e) => {
                debug!("completion lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    fn candidates(&self, req: &CompletionRequest) -> ApplicationResult<Vec<String>> {
        let project_of = |idx: usize| req.arg(idx).unwrap_or_default();
        let labels: Vec<String> = match req.kind {
            ArgKind::Command => crate::domain::command_names().map(String::from).collect(),
            ArgKind::Project => self.api.list_projects()?.into_iter().map(|p| p.label).collect(),
            ArgKind::Environment { project_arg } => self
                .api
                .list_project_environments(project_of(project_arg))?
                .into_iter()
                .map(|e| e.label)
                .collect(),
            ArgKind::Source { project_arg } => self
                .api
                .list_project_sources(project_of(project_arg))?
                .into_iter()
                .map(|s| s.channel_label)
                .collect(),
            ArgKind::Filter => self.api.list_filters()?.into_iter().map(|f| f.name).collect(),
            ArgKind::ProjectFilter { project_arg } => self
                .api
                .list_project_filters(project_of(project_arg))?
                .into_iter()
                .map(|f| f.filter.name)
                .collect(),
            ArgKind::FilterRule => FilterRule::ALL.iter().map(|r| r.to_string()).collect(),
            ArgKind::EntityType => self
                .api
                .list_filter_criteria()?
                .into_iter()
                .map(|c| c.entity_type)
                .collect(),
            ArgKind::CriteriaField { type_arg } => self
                .api
                .list_filter_criteria()?
                .into_iter()
                .filter(|c| Some(c.entity_type.as_str()) == req.arg(type_arg))
                .map(|c| c.field)
                .collect(),
            ArgKind::CriteriaMatcher {
                type_arg,
                field_arg,
            } => self
                .api
                .list_filter_criteria()?
                .into_iter()
                .filter(|c| {
                    Some(c.entity_type.as_str()) == req.arg(type_arg)
                        && Some(c.field.as_str()) == req.arg(field_arg)
                })
                .map(|c| c.matcher)
                .collect(),
            ArgKind::Any => Vec::new(),
        };
        Ok(labels)
    }
}

/// Split `a,b,,c` into `["a", "b", "c"]`.
fn split_sources(sources: &str) -> Vec<String> {
    sources
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_source_list_with_blanks_when_splitting_then_skips_empty() {
        assert_eq!(split_sources("a, b,,c,"), vec!["a", "b", "c"]);
        assert_eq!(split_sources("single"), vec!["single"]);
        assert!(split_sources(",").is_empty());
    }
}
