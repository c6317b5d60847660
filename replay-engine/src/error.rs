use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::driver::Target;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Where a run is. Transient; attached to errors so a failure names its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Setup,
    Scenario,
    ShoeChange,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunState {
    pub phase: Phase,
    /// 1-based once rounds start.
    pub round: usize,
    /// 1-based position within the round.
    pub scenario: usize,
}

impl RunState {
    #[must_use]
    pub const fn setup() -> Self {
        Self {
            phase: Phase::Setup,
            round: 0,
            scenario: 0,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            Phase::Setup => f.write_str("setup"),
            Phase::Scenario => write!(f, "round {} scenario {}", self.round, self.scenario),
            Phase::ShoeChange => write!(f, "round {} shoe change", self.round),
            Phase::Teardown => f.write_str("teardown"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StepError {
    #[error("driver action failed: {0}")]
    Driver(#[source] BoxError),
    #[error("{target} not visible after {timeout:?}")]
    NotSettled { target: Target, timeout: Duration },
}

impl StepError {
    pub(crate) fn driver<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Driver(Box::new(err))
    }
}

#[derive(Debug, Error)]
#[error("{state}: {source}")]
pub struct ReplayError {
    pub state: RunState,
    #[source]
    pub source: StepError,
}

impl ReplayError {
    pub(crate) fn at(state: RunState) -> impl FnOnce(StepError) -> Self {
        move |source| Self { state, source }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a round count (got {value:?})")]
    InvalidRounds { var: String, value: String },
    #[error("unknown suite {0:?}")]
    UnknownSuite(String),
}
