//! One full replay against a console: navigate, bootstrap, rounds, stop.

use log::info;
use serde::Serialize;

use crate::bootstrap::{BootstrapOutcome, SessionBootstrap, ToggleControls, ToggleState};
use crate::command::Keymap;
use crate::controller::{RoundController, RoundOrder, RunSummary};
use crate::driver::{Clock, ConsoleDriver};
use crate::error::{Phase, ReplayError, RunState, StepError};
use crate::pacing::Pacing;
use crate::scenario::ScenarioTable;
use crate::sequencer::{InputSequencer, ShoeChange};

#[derive(Debug, Clone)]
pub struct ReplayPlan {
    pub url: String,
    pub rounds: u32,
    pub order: RoundOrder,
    pub pacing: Pacing,
    pub keymap: Keymap,
    pub controls: ToggleControls,
    pub shoe_change: ShoeChange,
}

impl ReplayPlan {
    #[must_use]
    pub fn new(url: impl Into<String>, rounds: u32) -> Self {
        Self {
            url: url.into(),
            rounds,
            order: RoundOrder::Fixed,
            pacing: Pacing::default(),
            keymap: Keymap::default(),
            controls: ToggleControls::default(),
            shoe_change: ShoeChange::default(),
        }
    }

    #[must_use]
    pub const fn with_order(mut self, order: RoundOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    #[must_use]
    pub fn with_controls(mut self, controls: ToggleControls) -> Self {
        self.controls = controls;
        self
    }

    #[must_use]
    pub fn with_shoe_change(mut self, shoe_change: ShoeChange) -> Self {
        self.shoe_change = shoe_change;
        self
    }

    /// Drive `table` through the console described by this plan.
    ///
    /// # Errors
    ///
    /// The first failing step, tagged with the phase, round and scenario it
    /// failed in.
    pub async fn execute<D, C>(
        &self,
        table: &ScenarioTable,
        driver: &D,
        clock: &C,
    ) -> Result<ReplayOutcome, ReplayError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let setup = ReplayError::at(RunState::setup());
        info!("opening {}", self.url);
        driver
            .goto(&self.url)
            .await
            .map_err(|err| setup(StepError::driver(err)))?;
        clock.sleep(self.pacing.page_load).await;

        let bootstrap = SessionBootstrap::new(&self.controls, &self.pacing);
        let outcome = bootstrap
            .normalize(driver, clock)
            .await
            .map_err(ReplayError::at(RunState::setup()))?;
        if outcome == BootstrapOutcome::NoControls {
            return Ok(ReplayOutcome::Aborted);
        }

        let sequencer =
            InputSequencer::new(self.keymap.clone(), self.pacing.clone(), self.shoe_change.clone());
        let summary = RoundController::new(&sequencer, self.rounds, self.order)
            .run(table, driver, clock)
            .await?;

        let teardown = RunState {
            phase: Phase::Teardown,
            ..RunState::setup()
        };
        let stopped = bootstrap
            .shutdown(driver, clock)
            .await
            .map_err(ReplayError::at(teardown))?;

        Ok(ReplayOutcome::Completed {
            bootstrap: outcome,
            summary,
            state: if stopped {
                ToggleState::Stopped
            } else {
                ToggleState::Unknown
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ReplayOutcome {
    Completed {
        bootstrap: BootstrapOutcome,
        summary: RunSummary,
        /// Console state after teardown.
        state: ToggleState,
    },
    /// No start or stop control was found; nothing was typed.
    Aborted,
}

impl ReplayOutcome {
    #[must_use]
    pub const fn summary(&self) -> RunSummary {
        match self {
            Self::Completed { summary, .. } => *summary,
            Self::Aborted => RunSummary {
                rounds: 0,
                scenarios_executed: 0,
                shoe_changes: 0,
                skipped_resets: 0,
            },
        }
    }

    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}
