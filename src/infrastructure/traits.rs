//! I/O boundary traits for testability
//!
//! These traits abstract the remote server and the other side effects of the
//! shell, allowing services to be tested with fake implementations.

use std::time::Duration;

use crate::domain::{
    Channel, ContentFilter, CriteriaDefinition, Environment, FilterCriteria, FilterRule, Package,
    Project, ProjectFilter, ProjectSource,
};
use crate::infrastructure::error::ApiResult;

/// Content lifecycle API of the management server.
///
/// One method per remote procedure. Implementations own the authenticated
/// session.
pub trait ContentApi: Send + Sync {
    /// `contentmanagement.listProjects`
    fn list_projects(&self) -> ApiResult<Vec<Project>>;

    /// `contentmanagement.lookupProject`
    fn lookup_project(&self, project: &str) -> ApiResult<Project>;

    /// `contentmanagement.listProjectEnvironments`, in pipeline order.
    fn list_project_environments(&self, project: &str) -> ApiResult<Vec<Environment>>;

    /// `contentmanagement.listProjectSources`
    fn list_project_sources(&self, project: &str) -> ApiResult<Vec<ProjectSource>>;

    /// `contentmanagement.listProjectFilters`
    fn list_project_filters(&self, project: &str) -> ApiResult<Vec<ProjectFilter>>;

    /// `contentmanagement.listFilters`
    fn list_filters(&self) -> ApiResult<Vec<ContentFilter>>;

    /// `contentmanagement.listFilterCriteria`
    fn list_filter_criteria(&self) -> ApiResult<Vec<CriteriaDefinition>>;

    /// `contentmanagement.buildProject`
    fn build_project(&self, project: &str) -> ApiResult<()>;

    /// `contentmanagement.promoteProject`
    fn promote_project(&self, project: &str, env: &str) -> ApiResult<()>;

    /// `contentmanagement.createProject`
    fn create_project(&self, label: &str, name: &str, description: &str) -> ApiResult<()>;

    /// `contentmanagement.attachSource`
    fn attach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()>;

    /// `contentmanagement.detachSource`
    fn detach_source(&self, project: &str, source_type: &str, source: &str) -> ApiResult<()>;

    /// `contentmanagement.createEnvironment`; empty `predecessor` makes it the first stage.
    fn create_environment(
        &self,
        project: &str,
        predecessor: &str,
        label: &str,
        name: &str,
        description: &str,
    ) -> ApiResult<()>;

    /// `contentmanagement.removeEnvironment`
    fn remove_environment(&self, project: &str, env: &str) -> ApiResult<()>;

    /// `contentmanagement.createFilter`
    fn create_filter(
        &self,
        name: &str,
        rule: FilterRule,
        entity_type: &str,
        criteria: &FilterCriteria,
    ) -> ApiResult<()>;

    /// `contentmanagement.attachFilter`
    fn attach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()>;

    /// `contentmanagement.detachFilter`
    fn detach_filter(&self, project: &str, filter_id: i64) -> ApiResult<()>;

    /// `contentmanagement.createAppStreamFilters`
    fn create_appstream_filters(&self, prefix: &str, channel: &str, project: &str)
        -> ApiResult<()>;

    /// `channel.listSoftwareChannels`
    fn list_software_channels(&self) -> ApiResult<Vec<Channel>>;

    /// `channel.software.listAllPackages`
    fn list_channel_packages(&self, channel: &str) -> ApiResult<Vec<Package>>;
}

/// Blocking pause between retries.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Interactive credential entry.
pub trait CredentialPrompt: Send + Sync {
    /// Ask for a user name.
    fn username(&self, prompt: &str) -> Result<String, String>;

    /// Ask for a password without echoing it.
    fn password(&self, prompt: &str) -> Result<String, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Sleeps the current thread.
#[derive(Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Terminal prompts using dialoguer.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn username(&self, prompt: &str) -> Result<String, String> {
        dialoguer::Input::<String>::new()
            .with_prompt(prompt)
            .interact_text()
            .map_err(|e| e.to_string())
    }

    fn password(&self, prompt: &str) -> Result<String, String> {
        dialoguer::Password::new()
            .with_prompt(prompt)
            .allow_empty_password(false)
            .interact()
            .map_err(|e| e.to_string())
    }
}
