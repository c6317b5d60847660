use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::driver::{Clock, ConsoleDriver};
use crate::error::{Phase, ReplayError, RunState};
use crate::scenario::ScenarioTable;
use crate::sequencer::InputSequencer;

/// Order scenarios are replayed in within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RoundOrder {
    #[default]
    Fixed,
    /// Fresh permutation every round, drawn from one stream seeded once per run.
    Shuffled { seed: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub rounds: u32,
    pub scenarios_executed: u64,
    /// Shoe changes whose reset value was submitted.
    pub shoe_changes: u32,
    /// Shoe changes where the reset input never appeared.
    pub skipped_resets: u32,
}

/// Runs every scenario of a table, then a shoe change, `rounds` times.
#[derive(Debug, Clone)]
pub struct RoundController<'a> {
    sequencer: &'a InputSequencer,
    rounds: u32,
    order: RoundOrder,
}

impl<'a> RoundController<'a> {
    #[must_use]
    pub const fn new(sequencer: &'a InputSequencer, rounds: u32, order: RoundOrder) -> Self {
        Self {
            sequencer,
            rounds,
            order,
        }
    }

    /// # Errors
    ///
    /// Stops at the first failing step and reports which round and
    /// scenario it was.
    pub async fn run<D, C>(
        &self,
        table: &ScenarioTable,
        driver: &D,
        clock: &C,
    ) -> Result<RunSummary, ReplayError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let mut rng = match self.order {
            RoundOrder::Fixed => None,
            RoundOrder::Shuffled { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
        };
        let mut summary = RunSummary::default();

        for round in 1..=self.rounds {
            info!("Round {round} started ({} scenarios)", table.len());
            let shuffled;
            let scenarios = match rng.as_mut() {
                Some(rng) => {
                    shuffled = table.shuffled(rng);
                    &shuffled
                }
                None => table,
            };

            for (index, scenario) in scenarios.iter().enumerate() {
                let state = RunState {
                    phase: Phase::Scenario,
                    round: round as usize,
                    scenario: index + 1,
                };
                self.sequencer
                    .run_scenario(driver, clock, scenario)
                    .await
                    .map_err(ReplayError::at(state))?;
                summary.scenarios_executed += 1;
            }

            let state = RunState {
                phase: Phase::ShoeChange,
                round: round as usize,
                scenario: 0,
            };
            let reset = self
                .sequencer
                .run_shoe_change(driver, clock)
                .await
                .map_err(ReplayError::at(state))?;
            if reset {
                summary.shoe_changes += 1;
            } else {
                summary.skipped_resets += 1;
            }
            summary.rounds = round;
            info!("Round {round} completed");
        }

        Ok(summary)
    }
}
