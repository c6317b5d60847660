//! Bringing the console into a known running state before any input, and
//! stopping it afterwards.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::driver::{Clock, ConsoleDriver, Target};
use crate::error::StepError;
use crate::pacing::Pacing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    #[default]
    Unknown,
    Stopped,
    Running,
}

/// The start/stop toggle on the console page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleControls {
    pub start: Target,
    pub stop: Target,
}

impl Default for ToggleControls {
    fn default() -> Self {
        Self {
            start: Target::button("START"),
            stop: Target::button("STOP"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// The console was stopped; start was clicked.
    Started,
    /// The console was already running; it was stopped and started again.
    Restarted,
    /// Neither control was visible.
    NoControls,
}

impl BootstrapOutcome {
    #[must_use]
    pub const fn state(self) -> ToggleState {
        match self {
            Self::Started | Self::Restarted => ToggleState::Running,
            Self::NoControls => ToggleState::Unknown,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionBootstrap<'a> {
    controls: &'a ToggleControls,
    pacing: &'a Pacing,
}

impl<'a> SessionBootstrap<'a> {
    #[must_use]
    pub const fn new(controls: &'a ToggleControls, pacing: &'a Pacing) -> Self {
        Self { controls, pacing }
    }

    /// Leave the console running from a fresh start.
    ///
    /// # Errors
    ///
    /// Propagates driver failures. Missing controls are not an error; they
    /// are reported as [`BootstrapOutcome::NoControls`].
    pub async fn normalize<D, C>(&self, driver: &D, clock: &C) -> Result<BootstrapOutcome, StepError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let ControlsProbe { start, stop } = self.probe(driver).await?;

        if start {
            info!("console stopped, starting");
            driver
                .click(&self.controls.start)
                .await
                .map_err(StepError::driver)?;
            clock.sleep(self.pacing.toggle).await;
            return Ok(BootstrapOutcome::Started);
        }

        if stop {
            info!("console already running, restarting");
            driver
                .click(&self.controls.stop)
                .await
                .map_err(StepError::driver)?;
            clock.sleep(self.pacing.toggle).await;
            driver
                .click(&self.controls.start)
                .await
                .map_err(StepError::driver)?;
            clock.sleep(self.pacing.toggle).await;
            return Ok(BootstrapOutcome::Restarted);
        }

        warn!(
            "neither {} nor {} is visible, not replaying",
            self.controls.start, self.controls.stop
        );
        Ok(BootstrapOutcome::NoControls)
    }

    /// Click stop if it is showing. Returns whether it was clicked.
    ///
    /// # Errors
    ///
    /// Propagates driver failures.
    pub async fn shutdown<D, C>(&self, driver: &D, clock: &C) -> Result<bool, StepError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        let visible = driver
            .is_visible(&self.controls.stop, self.pacing.probe_timeout)
            .await
            .map_err(StepError::driver)?;
        if !visible {
            warn!("{} not visible after replay, leaving console as is", self.controls.stop);
            return Ok(false);
        }
        driver
            .click(&self.controls.stop)
            .await
            .map_err(StepError::driver)?;
        clock.sleep(self.pacing.toggle).await;
        info!("console stopped");
        Ok(true)
    }

    async fn probe<D>(&self, driver: &D) -> Result<ControlsProbe, StepError>
    where
        D: ConsoleDriver + ?Sized,
    {
        let timeout = self.pacing.probe_timeout;
        let start = driver
            .is_visible(&self.controls.start, timeout)
            .await
            .map_err(StepError::driver)?;
        // Only one of the two is ever shown.
        let stop = if start {
            false
        } else {
            driver
                .is_visible(&self.controls.stop, timeout)
                .await
                .map_err(StepError::driver)?
        };
        Ok(ControlsProbe { start, stop })
    }
}

struct ControlsProbe {
    start: bool,
    stop: bool,
}
