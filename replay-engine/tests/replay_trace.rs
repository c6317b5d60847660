use async_trait::async_trait;
use replay_engine::{
    Action, BootstrapOutcome, Clock, ConsoleDriver, InputSequencer, Key, Keymap, Pacing, Phase,
    ReplayOutcome, ReplayPlan, RoundOrder, RunSummary, Scenario, ScenarioTable, ShoeChange,
    StepError, Target, ToggleState,
};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
#[error("fake page: {0}")]
struct FakeError(String);

/// Console stand-in: records every action and flips START/STOP like the
/// real page does.
#[derive(Default)]
struct FakeConsole {
    /// `None` means the page has no toggle at all.
    running: Mutex<Option<bool>>,
    reset_input: bool,
    /// The reset input only shows up for probes willing to wait this long.
    reset_after: Duration,
    probes: Mutex<Vec<Duration>>,
    visible_css: Vec<String>,
    trace: Mutex<Vec<Action>>,
    visits: Mutex<Vec<String>>,
}

impl FakeConsole {
    fn stopped() -> Self {
        Self {
            running: Mutex::new(Some(false)),
            reset_input: true,
            ..Self::default()
        }
    }

    fn running() -> Self {
        Self {
            running: Mutex::new(Some(true)),
            reset_input: true,
            ..Self::default()
        }
    }

    fn trace(&self) -> Vec<Action> {
        self.trace.lock().unwrap().clone()
    }

    fn count(&self, action: &Action) -> usize {
        self.trace().iter().filter(|seen| *seen == action).count()
    }

    fn record(&self, action: Action) {
        self.trace.lock().unwrap().push(action);
    }
}

#[async_trait]
impl ConsoleDriver for FakeConsole {
    type Error = FakeError;

    async fn goto(&self, url: &str) -> Result<(), FakeError> {
        self.visits.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn is_visible(&self, target: &Target, timeout: Duration) -> Result<bool, FakeError> {
        let running = *self.running.lock().unwrap();
        Ok(match target {
            Target::Button(label) if label == "START" => running == Some(false),
            Target::Button(label) if label == "STOP" => running == Some(true),
            Target::Role(role) if role == "textbox" => {
                self.probes.lock().unwrap().push(timeout);
                self.reset_input && timeout >= self.reset_after
            }
            Target::Css(selector) => self.visible_css.contains(selector),
            _ => false,
        })
    }

    async fn click(&self, target: &Target) -> Result<(), FakeError> {
        let mut running = self.running.lock().unwrap();
        match (target, *running) {
            (Target::Button(label), Some(false)) if label == "START" => *running = Some(true),
            (Target::Button(label), Some(true)) if label == "STOP" => *running = Some(false),
            _ => return Err(FakeError(format!("{target} is not clickable"))),
        }
        drop(running);
        self.record(Action::Click(target.clone()));
        Ok(())
    }

    async fn fill(&self, target: &Target, text: &str) -> Result<(), FakeError> {
        self.record(Action::Fill(target.clone(), text.to_string()));
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<(), FakeError> {
        self.record(Action::Type(text.to_string()));
        Ok(())
    }

    async fn press(&self, key: Key) -> Result<(), FakeError> {
        self.record(Action::Press(key));
        Ok(())
    }

    async fn press_on(&self, target: &Target, key: Key) -> Result<(), FakeError> {
        self.record(Action::PressOn(target.clone(), key));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingClock {
    sleeps: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

fn plan(rounds: u32) -> ReplayPlan {
    ReplayPlan::new("http://console.test/#/longhu-baccarat-display", rounds)
        .with_pacing(Pacing::immediate())
}

fn table(scenarios: &[(&str, u8, u8)]) -> ScenarioTable {
    scenarios
        .iter()
        .map(|&(result, banker, player)| Scenario::new(result, banker, player).unwrap())
        .collect()
}

fn start() -> Target {
    Target::button("START")
}

fn stop() -> Target {
    Target::button("STOP")
}

#[test]
fn single_scenario_single_round_literal_trace() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    let outcome =
        tokio_test::block_on(plan(1).execute(&table(&[("1", 1, 0)]), &console, &clock)).unwrap();

    let textbox = Target::role("textbox");
    assert_eq!(
        console.trace(),
        vec![
            Action::Click(start()),
            Action::Type("**".into()),
            Action::Press(Key::Enter),
            Action::Type("//".into()),
            Action::Press(Key::Enter),
            Action::Type("1".into()),
            Action::Press(Key::Char('.')),
            Action::Type("1".into()),
            Action::Press(Key::Char('.')),
            Action::Type("0".into()),
            Action::Press(Key::Enter),
            Action::Type("++".into()),
            Action::Press(Key::Enter),
            Action::Fill(textbox.clone(), "123".into()),
            Action::PressOn(textbox, Key::Enter),
            Action::Click(stop()),
        ]
    );
    assert_eq!(
        outcome,
        ReplayOutcome::Completed {
            bootstrap: BootstrapOutcome::Started,
            summary: RunSummary {
                rounds: 1,
                scenarios_executed: 1,
                shoe_changes: 1,
                skipped_resets: 0,
            },
            state: ToggleState::Stopped,
        }
    );
    assert_eq!(
        *console.visits.lock().unwrap(),
        ["http://console.test/#/longhu-baccarat-display"]
    );
}

#[test]
fn every_round_runs_every_scenario_then_one_shoe_change() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    let scenarios = table(&[("1", 1, 0), ("14", 2, 1), ("16", 3, 2)]);
    let outcome = tokio_test::block_on(plan(4).execute(&scenarios, &console, &clock)).unwrap();

    assert_eq!(console.count(&Action::Type("**".into())), 12);
    assert_eq!(console.count(&Action::Type("++".into())), 4);
    assert_eq!(
        outcome.summary(),
        RunSummary {
            rounds: 4,
            scenarios_executed: 12,
            shoe_changes: 4,
            skipped_resets: 0,
        }
    );

    // Each round's shoe change comes after all of that round's scenarios.
    let markers: Vec<_> = console
        .trace()
        .into_iter()
        .filter(|action| matches!(action, Action::Type(text) if text == "**" || text == "++"))
        .collect();
    for round in markers.chunks(4) {
        assert_eq!(round.last(), Some(&Action::Type("++".into())));
    }
}

#[test]
fn running_console_is_stopped_then_started_once() {
    let console = FakeConsole::running();
    let clock = RecordingClock::default();
    let outcome =
        tokio_test::block_on(plan(1).execute(&table(&[("3", 0, 1)]), &console, &clock)).unwrap();

    let trace = console.trace();
    assert_eq!(trace[..2], [Action::Click(stop()), Action::Click(start())]);
    assert_eq!(trace[2], Action::Type("**".into()));
    assert_eq!(console.count(&Action::Click(start())), 1);
    assert!(matches!(
        outcome,
        ReplayOutcome::Completed {
            bootstrap: BootstrapOutcome::Restarted,
            ..
        }
    ));
}

#[test]
fn stopped_console_gets_exactly_one_start_before_input() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    tokio_test::block_on(plan(2).execute(&table(&[("2", 4, 4)]), &console, &clock)).unwrap();

    let trace = console.trace();
    assert_eq!(trace[0], Action::Click(start()));
    assert_eq!(console.count(&Action::Click(start())), 1);
    assert_eq!(console.count(&Action::Click(stop())), 1);
    assert_eq!(trace.last(), Some(&Action::Click(stop())));
}

#[test]
fn page_without_toggle_replays_nothing() {
    let console = FakeConsole {
        reset_input: true,
        ..FakeConsole::default()
    };
    let clock = RecordingClock::default();
    let outcome =
        tokio_test::block_on(plan(500).execute(&table(&[("1", 1, 0)]), &console, &clock)).unwrap();

    assert!(outcome.is_aborted());
    assert!(console.trace().is_empty());
    assert_eq!(outcome.summary().scenarios_executed, 0);
}

#[test]
fn zero_rounds_still_bootstraps_and_stops() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    let outcome =
        tokio_test::block_on(plan(0).execute(&table(&[("1", 1, 0)]), &console, &clock)).unwrap();

    assert_eq!(
        console.trace(),
        vec![Action::Click(start()), Action::Click(stop())]
    );
    assert_eq!(outcome.summary(), RunSummary::default());
}

#[test]
fn missing_reset_input_skips_the_fill() {
    let console = FakeConsole {
        reset_input: false,
        ..FakeConsole::stopped()
    };
    let clock = RecordingClock::default();
    let outcome =
        tokio_test::block_on(plan(1).execute(&table(&[("1", 1, 0)]), &console, &clock)).unwrap();

    assert!(
        !console
            .trace()
            .iter()
            .any(|action| matches!(action, Action::Fill(..) | Action::PressOn(..)))
    );
    assert_eq!(outcome.summary().shoe_changes, 0);
    assert_eq!(outcome.summary().skipped_resets, 1);
}

#[test]
fn late_reset_input_is_still_filled() {
    let console = FakeConsole {
        reset_after: Duration::from_millis(200),
        ..FakeConsole::stopped()
    };
    let clock = RecordingClock::default();
    let sequencer = InputSequencer::new(Keymap::default(), Pacing::baccarat(), ShoeChange::default());
    let reset = tokio_test::block_on(sequencer.run_shoe_change(&console, &clock)).unwrap();

    assert!(reset);
    assert_eq!(
        *console.probes.lock().unwrap(),
        [Pacing::baccarat().reset_probe]
    );
    let textbox = Target::role("textbox");
    assert_eq!(
        console.trace(),
        [
            Action::Type("++".into()),
            Action::Press(Key::Enter),
            Action::Fill(textbox.clone(), "123".into()),
            Action::PressOn(textbox, Key::Enter),
        ]
    );
}

#[test]
fn reset_input_slower_than_the_probe_counts_as_skipped() {
    let console = FakeConsole {
        reset_after: Duration::from_secs(30),
        ..FakeConsole::stopped()
    };
    let clock = RecordingClock::default();
    let pacing = Pacing::immediate().with_reset_probe(Duration::from_secs(2));
    let outcome = tokio_test::block_on(
        plan(2)
            .with_pacing(pacing)
            .execute(&table(&[("1", 1, 0)]), &console, &clock),
    )
    .unwrap();

    assert_eq!(console.count(&Action::Type("++".into())), 2);
    assert_eq!(
        outcome.summary(),
        RunSummary {
            rounds: 2,
            scenarios_executed: 2,
            shoe_changes: 0,
            skipped_resets: 2,
        }
    );
}

#[test]
fn settle_timeout_names_round_and_scenario() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    let pacing =
        Pacing::immediate().with_settle_target(Target::css("#result-ready"), Duration::from_secs(3));
    let err = tokio_test::block_on(
        plan(2)
            .with_pacing(pacing)
            .execute(&table(&[("1", 1, 0), ("14", 2, 1)]), &console, &clock),
    )
    .unwrap_err();

    assert_eq!(err.state.phase, Phase::Scenario);
    assert_eq!((err.state.round, err.state.scenario), (1, 1));
    assert!(matches!(err.source, StepError::NotSettled { .. }));
    assert!(err.to_string().starts_with("round 1 scenario 1:"));
}

#[test]
fn visible_settle_target_lets_the_run_through() {
    let console = FakeConsole {
        visible_css: vec!["#result-ready".into()],
        ..FakeConsole::stopped()
    };
    let clock = RecordingClock::default();
    let pacing =
        Pacing::immediate().with_settle_target(Target::css("#result-ready"), Duration::from_secs(3));
    let outcome = tokio_test::block_on(
        plan(1)
            .with_pacing(pacing)
            .execute(&table(&[("1", 1, 0)]), &console, &clock),
    )
    .unwrap();
    assert_eq!(outcome.summary().scenarios_executed, 1);
}

#[test]
fn baccarat_pacing_waits_between_keystrokes_and_after_confirm() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    tokio_test::block_on(
        ReplayPlan::new("http://console.test", 1).execute(&table(&[("1", 1, 0)]), &console, &clock),
    )
    .unwrap();

    let sleeps = clock.sleeps.lock().unwrap().clone();
    // page load, toggle, nine keystroke gaps, settle
    assert_eq!(sleeps[0], Duration::from_secs(3));
    assert_eq!(sleeps[1], Duration::from_secs(2));
    assert_eq!(
        sleeps[2..11],
        [Duration::from_secs(1); 9]
    );
    assert_eq!(sleeps[11], Duration::from_secs(10));
    assert_eq!(sleeps.last(), Some(&Duration::from_secs(2)));
}

#[test]
fn niu_niu_pacing_holds_longer_after_markers() {
    let console = FakeConsole::stopped();
    let clock = RecordingClock::default();
    let sequencer = InputSequencer::new(Keymap::default(), Pacing::niu_niu(), ShoeChange::default());
    tokio_test::block_on(sequencer.run_scenario(
        &console,
        &clock,
        &Scenario::new("88", 10, 3).unwrap(),
    ))
    .unwrap();

    let long = Duration::from_millis(1000);
    let short = Duration::from_millis(500);
    assert_eq!(
        *clock.sleeps.lock().unwrap(),
        [
            long,
            short,
            long,
            short,
            short,
            short,
            short,
            short,
            short,
            Duration::from_secs(10),
        ]
    );
}

#[test]
fn shuffled_rounds_replay_identically_for_a_seed() {
    let scenarios = table(&[("5", 1, 0), ("9", 2, 0), ("7", 6, 0), ("0", 0, 6), ("2", 1, 1)]);
    let run = |seed| {
        let console = FakeConsole::stopped();
        let clock = RecordingClock::default();
        tokio_test::block_on(
            plan(3)
                .with_order(RoundOrder::Shuffled { seed })
                .execute(&scenarios, &console, &clock),
        )
        .unwrap();
        console.trace()
    };

    assert_eq!(run(42), run(42));
    let trace = run(42);
    let results: Vec<_> = trace
        .windows(2)
        .filter_map(|pair| match pair {
            [Action::Press(Key::Enter), Action::Type(code)]
                if !code.starts_with(['*', '/', '+']) =>
            {
                Some(code.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 15);
    for round in results.chunks(5) {
        let mut codes = round.to_vec();
        codes.sort();
        assert_eq!(codes, ["0", "2", "5", "7", "9"]);
    }
}

#[test]
fn driver_failure_during_setup_is_reported_as_setup() {
    struct Offline;

    #[async_trait]
    impl ConsoleDriver for Offline {
        type Error = FakeError;

        async fn goto(&self, url: &str) -> Result<(), FakeError> {
            Err(FakeError(format!("cannot reach {url}")))
        }
        async fn is_visible(&self, _: &Target, _: Duration) -> Result<bool, FakeError> {
            Ok(false)
        }
        async fn click(&self, _: &Target) -> Result<(), FakeError> {
            Ok(())
        }
        async fn fill(&self, _: &Target, _: &str) -> Result<(), FakeError> {
            Ok(())
        }
        async fn type_text(&self, _: &str) -> Result<(), FakeError> {
            Ok(())
        }
        async fn press(&self, _: Key) -> Result<(), FakeError> {
            Ok(())
        }
        async fn press_on(&self, _: &Target, _: Key) -> Result<(), FakeError> {
            Ok(())
        }
    }

    let err = tokio_test::block_on(plan(1).execute(
        &table(&[("1", 1, 0)]),
        &Offline,
        &RecordingClock::default(),
    ))
    .unwrap_err();
    assert_eq!(err.state.phase, Phase::Setup);
    assert!(matches!(err.source, StepError::Driver(_)));
}
