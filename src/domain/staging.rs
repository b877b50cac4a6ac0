//! Staging pipeline planning.

use std::fmt;

use crate::domain::entities::Environment;

/// Order in which the pipeline is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingDirection {
    /// Build first, then promote from the first stage onwards.
    Forward,
    /// Promote from the last source stage backwards, build last.
    Reverse,
}

/// One remote step of a staging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagingStep {
    Build,
    Promote(String),
}

impl fmt::Display for StagingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingStep::Build => f.write_str("build"),
            StagingStep::Promote(env) => write!(f, "promote {env}"),
        }
    }
}

/// Steps to run for the given pipeline.
///
/// The last environment only receives content, so it is never promoted.
pub fn staging_plan(envs: &[Environment], direction: StagingDirection) -> Vec<StagingStep> {
    let sources = &envs[..envs.len().saturating_sub(1)];
    let promotions = sources.iter().map(|e| StagingStep::Promote(e.label.clone()));

    match direction {
        StagingDirection::Forward => std::iter::once(StagingStep::Build)
            .chain(promotions)
            .collect(),
        StagingDirection::Reverse => {
            let mut steps: Vec<StagingStep> = promotions.rev().collect();
            steps.push(StagingStep::Build);
            steps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envs(labels: &[&str]) -> Vec<Environment> {
        labels
            .iter()
            .map(|l| Environment {
                label: l.to_string(),
                name: l.to_string(),
                description: String::new(),
                status: "built".into(),
                version: 1,
                last_build_date: None,
            })
            .collect()
    }

    #[test]
    fn given_three_stages_when_planning_forward_then_build_and_promote_all_but_last() {
        let plan = staging_plan(&envs(&["dev", "test", "prod"]), StagingDirection::Forward);
        assert_eq!(
            plan,
            vec![
                StagingStep::Build,
                StagingStep::Promote("dev".into()),
                StagingStep::Promote("test".into()),
            ]
        );
    }

    #[test]
    fn given_three_stages_when_planning_reverse_then_promote_backwards_and_build_last() {
        let plan = staging_plan(&envs(&["dev", "test", "prod"]), StagingDirection::Reverse);
        assert_eq!(
            plan,
            vec![
                StagingStep::Promote("test".into()),
                StagingStep::Promote("dev".into()),
                StagingStep::Build,
            ]
        );
    }

    #[test]
    fn given_no_stages_when_planning_then_only_build() {
        assert_eq!(
            staging_plan(&[], StagingDirection::Forward),
            vec![StagingStep::Build]
        );
        assert_eq!(
            staging_plan(&[], StagingDirection::Reverse),
            vec![StagingStep::Build]
        );
    }

    #[test]
    fn given_single_stage_when_planning_then_nothing_to_promote() {
        let plan = staging_plan(&envs(&["dev"]), StagingDirection::Forward);
        assert_eq!(plan, vec![StagingStep::Build]);
    }
}
