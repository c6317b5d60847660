//! Pauses between console inputs and the settle wait after each scenario.

use std::time::Duration;

use crate::driver::{Clock, ConsoleDriver, Target};
use crate::error::StepError;

/// How to wait for the console to finish reacting to a confirmed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settle {
    Pause(Duration),
    /// Poll until the target shows up; fail if it does not within `timeout`.
    UntilVisible { target: Target, timeout: Duration },
}

impl Settle {
    /// # Errors
    ///
    /// [`StepError::NotSettled`] when the target never shows up, or the
    /// driver's own error.
    pub async fn wait<D, C>(&self, driver: &D, clock: &C) -> Result<(), StepError>
    where
        D: ConsoleDriver + ?Sized,
        C: Clock + ?Sized,
    {
        match self {
            Self::Pause(duration) => {
                clock.sleep(*duration).await;
                Ok(())
            }
            Self::UntilVisible { target, timeout } => {
                let visible = driver
                    .is_visible(target, *timeout)
                    .await
                    .map_err(StepError::driver)?;
                if visible {
                    Ok(())
                } else {
                    Err(StepError::NotSettled {
                        target: target.clone(),
                        timeout: *timeout,
                    })
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    /// After typing a mode marker (`**`, `//`, `++`).
    pub marker: Duration,
    /// After every other keystroke group inside a scenario or shoe change.
    pub keystroke: Duration,
    /// After a scenario's final confirm.
    pub scenario_settle: Settle,
    /// Between steps on the shoe change reset input.
    pub reset_input: Duration,
    /// How long the shoe change reset input may take to appear.
    pub reset_probe: Duration,
    pub reset_settle: Settle,
    /// After navigating to the console.
    pub page_load: Duration,
    /// After clicking start or stop.
    pub toggle: Duration,
    /// How long a visibility probe may wait.
    pub probe_timeout: Duration,
}

impl Pacing {
    /// Profile for the baccarat and dragon-tiger consoles.
    #[must_use]
    pub const fn baccarat() -> Self {
        Self {
            marker: Duration::from_millis(1000),
            keystroke: Duration::from_millis(1000),
            scenario_settle: Settle::Pause(Duration::from_secs(10)),
            reset_input: Duration::from_millis(500),
            reset_probe: Duration::from_secs(10),
            reset_settle: Settle::Pause(Duration::from_secs(5)),
            page_load: Duration::from_secs(3),
            toggle: Duration::from_secs(2),
            probe_timeout: Duration::ZERO,
        }
    }

    /// Niu niu types faster between digits; markers keep the full pause.
    #[must_use]
    pub fn niu_niu() -> Self {
        Self {
            keystroke: Duration::from_millis(500),
            ..Self::baccarat()
        }
    }

    /// No waiting at all.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            marker: Duration::ZERO,
            keystroke: Duration::ZERO,
            scenario_settle: Settle::Pause(Duration::ZERO),
            reset_input: Duration::ZERO,
            reset_probe: Duration::ZERO,
            reset_settle: Settle::Pause(Duration::ZERO),
            page_load: Duration::ZERO,
            toggle: Duration::ZERO,
            probe_timeout: Duration::ZERO,
        }
    }

    /// Replace the fixed post-scenario pause with a visibility wait.
    #[must_use]
    pub fn with_settle_target(mut self, target: Target, timeout: Duration) -> Self {
        self.scenario_settle = Settle::UntilVisible { target, timeout };
        self
    }

    #[must_use]
    pub fn with_reset_probe(mut self, timeout: Duration) -> Self {
        self.reset_probe = timeout;
        self
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::baccarat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn niu_niu_only_changes_keystroke_pause() {
        let niu = Pacing::niu_niu();
        let bac = Pacing::baccarat();
        assert_eq!(niu.keystroke, Duration::from_millis(500));
        assert_eq!(niu.marker, Duration::from_millis(1000));
        assert_eq!(niu.reset_probe, bac.reset_probe);
        assert_eq!(niu.scenario_settle, bac.scenario_settle);
        assert_eq!(niu.toggle, bac.toggle);
    }

    #[test]
    fn settle_target_replaces_scenario_pause() {
        let pacing = Pacing::baccarat()
            .with_settle_target(Target::css("#result-ready"), Duration::from_secs(15));
        assert!(matches!(
            pacing.scenario_settle,
            Settle::UntilVisible { ref target, .. } if *target == Target::css("#result-ready")
        ));
        assert_eq!(pacing.reset_settle, Settle::Pause(Duration::from_secs(5)));
    }

    #[test]
    fn reset_probe_waits_by_default() {
        assert!(Pacing::baccarat().reset_probe > Duration::ZERO);
        let pacing = Pacing::niu_niu().with_reset_probe(Duration::from_secs(3));
        assert_eq!(pacing.reset_probe, Duration::from_secs(3));
    }
}
