//! Replay Engine
//!
//! Platform-agnostic core for replaying game result scenarios into a
//! keyboard-driven result console. Scenario tables, the console input
//! protocol and the round loop live here; the browser and the clock are
//! supplied by the caller through [`ConsoleDriver`] and [`Clock`].

pub mod bootstrap;
pub mod command;
pub mod controller;
pub mod driver;
pub mod error;
pub mod pacing;
pub mod replay;
pub mod scenario;
pub mod sequencer;
pub mod suite;
pub mod tables;

// Re-export commonly used types
pub use bootstrap::{BootstrapOutcome, SessionBootstrap, ToggleControls, ToggleState};
pub use command::{ConsoleCommand, Keymap};
pub use controller::{RoundController, RoundOrder, RunSummary};
#[cfg(feature = "async")]
pub use driver::TokioClock;
pub use driver::{Action, Clock, ConsoleDriver, Key, Target};
pub use error::{BoxError, ConfigError, Phase, ReplayError, RunState, StepError};
pub use pacing::{Pacing, Settle};
pub use replay::{ReplayOutcome, ReplayPlan};
pub use scenario::{HandValue, Hands, ResultCode, Scenario, ScenarioError, ScenarioTable};
pub use sequencer::{InputSequencer, ShoeChange};
pub use suite::{DEFAULT_ROUNDS, OrderPolicy, PacingProfile, Suite, find_suite, resolve_rounds, suites};
pub use tables::TableId;
