//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{ContentService, RetryPolicy, StagingService};
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::http::HttpContentApi;
use crate::infrastructure::traits::{ContentApi, CredentialPrompt, Sleeper, ThreadSleeper};

/// Container holding the session and the services built on it.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Remote API session
    pub api: Arc<dyn ContentApi>,

    /// Pause between staging retries
    pub sleeper: Arc<dyn Sleeper>,
}

impl ServiceContainer {
    /// Log in to the configured server, prompting for missing credentials.
    pub fn connect(mut settings: Settings, prompt: &dyn CredentialPrompt) -> InfraResult<Self> {
        if settings.username.trim().is_empty() {
            settings.username = prompt
                .username("Username")
                .map_err(|message| InfraError::Prompt { message })?;
        }
        let password = match settings.password.clone() {
            Some(p) => p,
            None => prompt
                .password("Password")
                .map_err(|message| InfraError::Prompt { message })?,
        };

        let url = settings.api_url();
        debug!("connect: url={} user={}", url, settings.username);
        let api = HttpContentApi::connect(&url, &settings.username, &password, settings.timeout())?;

        Ok(Self::with_deps(
            settings,
            Arc::new(api),
            Arc::new(ThreadSleeper),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        api: Arc<dyn ContentApi>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            api,
            sleeper,
        }
    }

    pub fn content(&self) -> ContentService {
        ContentService::new(self.api.clone())
    }

    pub fn staging(&self) -> StagingService {
        StagingService::new(
            self.api.clone(),
            self.sleeper.clone(),
            RetryPolicy::from(self.settings.staging.clone()),
        )
    }
}
