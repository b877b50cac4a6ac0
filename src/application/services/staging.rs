//! Staging pipeline service
//!
//! Walks a project's environments and builds/promotes stage by stage. The
//! server rejects a build or promotion while another one is still running,
//! so each step is retried under a bounded policy.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::StagingConfig;
use crate::domain::{staging_plan, StagingDirection, StagingStep};
use crate::infrastructure::traits::{ContentApi, Sleeper};
use crate::infrastructure::ApiResult;

/// Bounded retry with doubling delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        StagingConfig::default().into()
    }
}

impl From<StagingConfig> for RetryPolicy {
    fn from(cfg: StagingConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_delay: Duration::from_secs(cfg.retry_interval_secs),
            max_delay: Duration::from_secs(cfg.max_interval_secs),
        }
    }
}

/// Service running the full staging pipeline of a project.
pub struct StagingService {
    api: Arc<dyn ContentApi>,
    sleeper: Arc<dyn Sleeper>,
    policy: RetryPolicy,
}

impl StagingService {
    pub fn new(api: Arc<dyn ContentApi>, sleeper: Arc<dyn Sleeper>, policy: RetryPolicy) -> Self {
        Self {
            api,
            sleeper,
            policy,
        }
    }

    /// Run every step of the pipeline, calling `progress` after each completed step.
    #[instrument(skip(self, progress))]
    pub fn run(
        &self,
        project: &str,
        direction: StagingDirection,
        mut progress: impl FnMut(&StagingStep),
    ) -> ApplicationResult<Vec<StagingStep>> {
        let envs = self.api.list_project_environments(project)?;
        let plan = staging_plan(&envs, direction);
        info!("staging {}: {} steps", project, plan.len());

        for step in &plan {
            self.run_step(project, step)?;
            progress(step);
        }
        Ok(plan)
    }

    fn run_step(&self, project: &str, step: &StagingStep) -> ApplicationResult<()> {
        let mut attempt = 1;
        loop {
            match self.call(project, step) {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.policy.max_attempts => {
                    return Err(ApplicationError::Staging {
                        step: step.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        step, attempt, self.policy.max_attempts, delay, e
                    );
                    self.sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }

    fn call(&self, project: &str, step: &StagingStep) -> ApiResult<()> {
        match step {
            StagingStep::Build => self.api.build_project(project),
            StagingStep::Promote(env) => self.api.promote_project(project, env),
        }
    }
}
