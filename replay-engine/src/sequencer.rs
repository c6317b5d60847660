//! Turns one scenario, or one shoe change, into console input.

use log::{debug, warn};
use smallvec::SmallVec;
use std::time::Duration;

use crate::command::{ConsoleCommand, Keymap};
use crate::driver::{Action, Clock, ConsoleDriver, Key, Target};
use crate::error::StepError;
use crate::pacing::Pacing;
use crate::scenario::Scenario;

pub type Commands = SmallVec<[ConsoleCommand; 12]>;

/// The secondary input the console opens after a shoe change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoeChange {
    pub reset_input: Target,
    pub reset_value: String,
}

impl Default for ShoeChange {
    fn default() -> Self {
        Self {
            reset_input: Target::role("textbox"),
            reset_value: "123".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputSequencer {
    keymap: Keymap,
    pacing: Pacing,
    shoe_change: ShoeChange,
}

impl InputSequencer {
    #[must_use]
    pub const fn new(keymap: Keymap, pacing: Pacing, shoe_change: ShoeChange) -> Self {
        Self {
            keymap,
            pacing,
            shoe_change,
        }
    }

    #[must_use]
    pub const fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    /// Protocol for one scenario, ending in the confirm that submits it.
    #[must_use]
    pub fn commands(scenario: &Scenario) -> Commands {
        let mut commands = Commands::new();
        commands.push(ConsoleCommand::EnterEditMode);
        commands.push(ConsoleCommand::Confirm);
        commands.push(ConsoleCommand::EnterResultMode);
        commands.push(ConsoleCommand::Confirm);
        commands.push(ConsoleCommand::TypeDigits(scenario.result().to_string()));
        if let Some(hands) = scenario.hands() {
            commands.push(ConsoleCommand::Separator);
            commands.push(ConsoleCommand::TypeDigits(hands.banker.digits()));
            commands.push(ConsoleCommand::Separator);
            commands.push(ConsoleCommand::TypeDigits(hands.player.digits()));
        }
        commands.push(ConsoleCommand::Confirm);
        commands
    }

    #[must_use]
    pub fn actions(&self, scenario: &Scenario) -> SmallVec<[Action; 12]> {
        Self::commands(scenario)
            .iter()
            .map(|command| self.keymap.action(command))
            .collect()
    }

    /// Type one scenario into the console and wait for it to settle.
    ///
    /// # Errors
    ///
    /// Fails on the first driver error or when the settle wait times out.
    pub async fn run_scenario<D, C>(
        &self,
        driver: &D,
        clock: &C,
        scenario: &Scenario,
    ) -> Result<(), StepError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let commands = Self::commands(scenario);
        let last = commands.len().saturating_sub(1);
        for (index, command) in commands.iter().enumerate() {
            let action = self.keymap.action(command);
            debug!("{scenario}: {action}");
            driver.perform(&action).await.map_err(StepError::driver)?;
            if index < last {
                clock.sleep(self.pause_after(command)).await;
            }
        }
        self.pacing.scenario_settle.wait(driver, clock).await
    }

    /// Switch to shoe change mode, confirm, and submit the reset value.
    ///
    /// Returns whether the reset value was submitted. The reset input gets
    /// up to `reset_probe` to appear; when it never does the fill is
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Fails on the first driver error or when the settle wait times out.
    pub async fn run_shoe_change<D, C>(&self, driver: &D, clock: &C) -> Result<bool, StepError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let enter = ConsoleCommand::EnterShoeChangeMode;
        driver
            .perform(&self.keymap.action(&enter))
            .await
            .map_err(StepError::driver)?;
        clock.sleep(self.pause_after(&enter)).await;
        let confirm = self.keymap.action(&ConsoleCommand::Confirm);
        driver.perform(&confirm).await.map_err(StepError::driver)?;

        let input = &self.shoe_change.reset_input;
        let present = driver
            .is_visible(input, self.pacing.reset_probe)
            .await
            .map_err(StepError::driver)?;
        if !present {
            warn!(
                "shoe change: {input} not visible within {:?}, reset value not submitted",
                self.pacing.reset_probe
            );
            return Ok(false);
        }
        clock.sleep(self.pacing.reset_input).await;
        driver
            .fill(input, &self.shoe_change.reset_value)
            .await
            .map_err(StepError::driver)?;
        clock.sleep(self.pacing.reset_input).await;
        driver
            .press_on(input, confirm_key(&confirm))
            .await
            .map_err(StepError::driver)?;
        self.pacing.reset_settle.wait(driver, clock).await?;
        Ok(true)
    }

    fn pause_after(&self, command: &ConsoleCommand) -> Duration {
        if command.is_marker() {
            self.pacing.marker
        } else {
            self.pacing.keystroke
        }
    }
}

fn confirm_key(confirm: &Action) -> Key {
    match confirm {
        Action::Press(key) => *key,
        _ => Key::Enter,
    }
}
