mod api;
mod browser;
mod common;
mod policy;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use api::{ApiChecks, ApiConfig, ApiFlow, DEFAULT_API_BASE_URL};
use browser::{BrowserConfig, BrowserKind, WebDriverConsole, new_session};
use common::{FlowResult, RunReport, SuiteResult, artifacts_dir, capture_artifacts, split_csv};
use policy::RetryPolicy;
use replay_engine::{
    ReplayOutcome, ReplayPlan, ScenarioTable, Suite, Target, TokioClock, find_suite,
    resolve_rounds, suites,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TestMode {
    /// Replay scenario tables into the result console
    Replay,
    /// Run the VIP member API checks
    Api,
    /// Run both
    Both,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HeadlessMode {
    /// Run browsers in headless mode
    Headless,
    /// Run browsers with visible windows
    Windowed,
}

impl HeadlessMode {
    const fn is_headless(self) -> bool {
        matches!(self, Self::Headless)
    }
}

#[derive(Debug, Parser)]
#[command(name = "replay-tester", version = "0.1.0")]
#[command(
    about = "Replays game result scenarios into the result console and checks the VIP member API"
)]
struct Args {
    /// Test mode: replay (browser), api, or both
    #[arg(long, value_enum, default_value_t = TestMode::Replay)]
    mode: TestMode,

    /// Suites to replay (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    suites: String,

    /// List all available suites and exit
    #[arg(long)]
    list_suites: bool,

    /// Rounds per suite; overrides BACCARAT_ROUND / DT_BACCARAT_ROUND / NIU_NIU_ROUND
    #[arg(long)]
    rounds: Option<u32>,

    /// JSON scenario table replayed instead of each suite's built-in table
    #[arg(long)]
    table: Option<PathBuf>,

    /// Seed for shuffled suites (random and printed when omitted)
    #[arg(long)]
    shuffle_seed: Option<u64>,

    /// Base URL of the result console
    #[arg(long, default_value = "http://192.168.40.235:3001/")]
    base_url: String,

    /// Browsers to run (chrome,edge,firefox,safari)
    #[arg(long, default_value = "chrome")]
    browsers: String,

    /// Connect to a Selenium Grid/Appium hub instead of local drivers
    #[arg(long)]
    hub: Option<String>,

    /// Run headless where supported
    #[arg(long, value_enum, default_value_t = HeadlessMode::Headless)]
    headless: HeadlessMode,

    /// CSS selector that appears once the console has settled a scenario;
    /// replaces the fixed post-scenario pause
    #[arg(long)]
    settle_selector: Option<String>,

    /// How long to wait for --settle-selector
    #[arg(long, default_value_t = 10)]
    settle_timeout_secs: u64,

    /// How long a control, or the shoe change reset input, may take to become visible
    #[arg(long, default_value_t = 10)]
    action_timeout_secs: u64,

    /// Whole-suite retries (default: 2 when CI is set, otherwise 0)
    #[arg(long)]
    retries: Option<u32>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Artifacts directory for screenshots and page sources of failed attempts
    #[arg(long, default_value = "target/test-artifacts")]
    artifacts_dir: String,

    /// Base URL of the VIP member API
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Directory for slow_apis.json and fast_apis.json
    #[arg(long, default_value = "target/api-ledger")]
    api_ledger_dir: PathBuf,

    /// Image uploaded by the category flows
    #[arg(long, default_value = "tests/images/scan.png")]
    api_image: PathBuf,

    /// API flows to run (comma-separated, or "all")
    #[arg(long, default_value = "all")]
    api_flows: String,

    /// Category updated by the update-category flow
    #[arg(long, default_value_t = 130)]
    category_id: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_suites(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let seed = args.shuffle_seed.unwrap_or_else(rand::random);
    println!(
        "🔀 Shuffle seed: {} (pass --shuffle-seed {seed} to reproduce)",
        seed.to_string().bright_white()
    );

    let suites = expand_suites(&args.suites);
    let table = load_table_override(args.table.as_deref())?;

    let report = RunReport {
        suites: run_replay_suites(&args, &suites, table.as_ref(), seed).await?,
        api: run_api_checks(&args, seed).await?,
    };

    write_reports(&args, &report, start_time)?;

    if report.any_failed() {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_suites(args: &Args) -> Result<bool> {
    if !args.list_suites {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available suites:")?;
    for suite in suites() {
        writeln!(
            output_target.writer(),
            "  {:18} - {} ({} scenarios, rounds from {})",
            suite.key,
            suite.name,
            suite.table.table().len(),
            suite.rounds_env
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🎰 Console Replay Tester".bright_cyan().bold());
    println!("{}", "================================".cyan());
}

fn expand_suites(suites_arg: &str) -> Vec<String> {
    let mut keys = split_csv(suites_arg);
    if keys.iter().any(|k| k == "all") {
        keys.retain(|k| k != "all");
        for suite in suites() {
            if !keys.iter().any(|k| k == suite.key) {
                keys.push(suite.key.to_string());
            }
        }
    }
    keys
}

fn expand_flows(flows_arg: &str) -> Vec<ApiFlow> {
    let mut flows: Vec<ApiFlow> = Vec::new();
    for name in split_csv(flows_arg) {
        let named = if name == "all" {
            ApiFlow::ALL.to_vec()
        } else if let Some(flow) = ApiFlow::parse(&name) {
            vec![flow]
        } else {
            eprintln!("⚠️  Unknown API flow: {}", name.yellow());
            continue;
        };
        for flow in named {
            if !flows.contains(&flow) {
                flows.push(flow);
            }
        }
    }
    flows
}

fn load_table_override(path: Option<&Path>) -> Result<Option<ScenarioTable>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let table = ScenarioTable::from_json(&json)
        .with_context(|| format!("invalid scenario table {}", path.display()))?;
    info!("loaded {} scenarios from {}", table.len(), path.display());
    Ok(Some(table))
}

fn build_browser_config(args: &Args) -> BrowserConfig {
    BrowserConfig {
        headless: args.headless.is_headless(),
        implicit_wait: Duration::ZERO,
        remote_hub: args.hub.clone(),
    }
}

fn build_plan(args: &Args, suite: &Suite, rounds: u32, seed: u64) -> ReplayPlan {
    let plan = suite.plan(&args.base_url, rounds, seed);
    let mut pacing = plan
        .pacing
        .clone()
        .with_reset_probe(Duration::from_secs(args.action_timeout_secs));
    if let Some(selector) = &args.settle_selector {
        pacing = pacing.with_settle_target(
            Target::css(selector.clone()),
            Duration::from_secs(args.settle_timeout_secs),
        );
    }
    plan.with_pacing(pacing)
}

/// Known suites with their plans. Unknown keys are reported and skipped; a
/// malformed round count in the environment is an error.
fn resolve_plans(
    args: &Args,
    keys: &[String],
    seed: u64,
) -> Result<Vec<(&'static Suite, ReplayPlan)>> {
    let mut plans = Vec::new();
    for key in keys {
        let suite = match find_suite(key) {
            Ok(suite) => suite,
            Err(e) => {
                eprintln!("⚠️  {}", e.to_string().yellow());
                continue;
            }
        };
        let rounds = resolve_rounds(args.rounds, suite.rounds_env, |var| {
            std::env::var(var).ok()
        })
        .with_context(|| format!("resolving rounds for {}", suite.key))?;
        plans.push((suite, build_plan(args, suite, rounds, seed)));
    }
    Ok(plans)
}

async fn run_replay_suites(
    args: &Args,
    keys: &[String],
    table_override: Option<&ScenarioTable>,
    seed: u64,
) -> Result<Vec<SuiteResult>> {
    let mut results = Vec::new();
    if !matches!(args.mode, TestMode::Replay | TestMode::Both) {
        return Ok(results);
    }

    println!("{}", "🌐 Running Replay Suites".bright_blue().bold());
    println!("{}", "-".repeat(30).blue());

    let plans = resolve_plans(args, keys, seed)?;
    let policy = RetryPolicy::resolve(args.retries, |var| std::env::var(var).ok());

    for browser_name in split_csv(&args.browsers) {
        let Some(kind) = BrowserKind::parse(&browser_name) else {
            eprintln!("⚠️  Unknown browser: {}", browser_name.yellow());
            continue;
        };

        let cfg = build_browser_config(args);
        let driver = match new_session(kind, &cfg).await {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Could not start {kind}: {e}");
                results.extend(plans.iter().map(|(suite, plan)| SuiteResult {
                    suite: suite.key.to_string(),
                    browser: kind.to_string(),
                    passed: false,
                    attempts: 0,
                    rounds: plan.rounds,
                    scenarios_executed: 0,
                    shoe_changes: 0,
                    skipped_resets: 0,
                    aborted: false,
                    failures: vec![format!("could not start {kind}: {e}")],
                    duration: Duration::ZERO,
                }));
                continue;
            }
        };

        for (suite, plan) in &plans {
            let table = table_override.unwrap_or_else(|| suite.table.table());
            if args.verbose {
                println!(
                    "   {} {} rounds x {} scenarios, {:?}",
                    plan.url.dimmed(),
                    plan.rounds,
                    table.len(),
                    plan.order
                );
            }
            results.push(run_suite(args, kind, &driver, suite, plan, table, policy).await);
        }
        let _ = driver.quit().await;
    }

    Ok(results)
}

/// One suite on one browser, retried as a whole.
async fn run_suite(
    args: &Args,
    kind: BrowserKind,
    driver: &thirtyfour::WebDriver,
    suite: &Suite,
    plan: &ReplayPlan,
    table: &ScenarioTable,
    policy: RetryPolicy,
) -> SuiteResult {
    let label = kind.to_string();
    let console = WebDriverConsole::new(driver, Duration::from_secs(args.action_timeout_secs));
    let suite_start = Instant::now();
    let mut failures = Vec::new();
    let mut last: Option<ReplayOutcome> = None;
    let mut attempts = 0;

    for attempt in 1..=policy.attempts() {
        attempts = attempt;
        let attempt_start = Instant::now();
        match plan.execute(table, &console, &TokioClock).await {
            Ok(outcome) if !outcome.is_aborted() => {
                let summary = outcome.summary();
                println!(
                    "✅ [{}] {} - {} rounds, {} scenarios - {:?}",
                    label.green(),
                    suite.key,
                    summary.rounds,
                    summary.scenarios_executed,
                    attempt_start.elapsed()
                );
                last = Some(outcome);
                break;
            }
            Ok(outcome) => {
                eprintln!(
                    "⚠️  [{}] {} - no START/STOP control found (attempt {attempt})",
                    label.yellow(),
                    suite.key
                );
                failures.push(format!("attempt {attempt}: no START/STOP control found"));
                last = Some(outcome);
            }
            Err(e) => {
                let err = anyhow::Error::new(e).context(format!("{} attempt {attempt}", suite.key));
                eprintln!(
                    "❌ [{}] {} - {:?}: {:#}",
                    label.red(),
                    suite.key,
                    attempt_start.elapsed(),
                    err
                );
                let dir = artifacts_dir(&args.artifacts_dir, &label, suite.key, attempt);
                if let Err(capture) = capture_artifacts(driver, &dir, &err).await {
                    warn!("failed to capture artifacts in {dir}: {capture:#}");
                }
                failures.push(format!("{err:#}"));
                last = None;
            }
        }
    }

    let summary = last.map(|outcome| outcome.summary()).unwrap_or_default();
    let aborted = last.is_some_and(|outcome| outcome.is_aborted());
    SuiteResult {
        suite: suite.key.to_string(),
        browser: label,
        passed: last.is_some() && !aborted,
        attempts,
        rounds: summary.rounds,
        scenarios_executed: summary.scenarios_executed,
        shoe_changes: summary.shoe_changes,
        skipped_resets: summary.skipped_resets,
        aborted,
        failures,
        duration: suite_start.elapsed(),
    }
}

fn build_api_config(args: &Args) -> ApiConfig {
    ApiConfig {
        base_url: args.api_base_url.clone(),
        image: args.api_image.clone(),
        category_id: args.category_id,
        ledger_dir: args.api_ledger_dir.clone(),
        ..ApiConfig::default()
    }
}

async fn run_api_checks(args: &Args, seed: u64) -> Result<Vec<FlowResult>> {
    let mut results = Vec::new();
    if !matches!(args.mode, TestMode::Api | TestMode::Both) {
        return Ok(results);
    }

    println!("{}", "🔌 Running API Checks".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let checks =
        ApiChecks::new(build_api_config(args), seed).context("failed to build the API client")?;
    for flow in expand_flows(&args.api_flows) {
        let result = checks.run(flow).await;
        if result.passed {
            println!(
                "✅ [{}] {} - {:?}",
                "api".green(),
                result.flow,
                result.duration
            );
        } else {
            eprintln!(
                "❌ [{}] {} - {:?}: {}",
                "api".red(),
                result.flow,
                result.duration,
                result.detail
            );
        }
        if args.verbose {
            for call in &result.requests {
                println!("   {} {} ({} ms)", call.method, call.url.dimmed(), call.ms);
            }
        }
        results.push(result);
    }
    Ok(results)
}

fn write_reports(args: &Args, report: &RunReport, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            common::reports::generate_json_report(&mut output_target, report)?;
        }
        "markdown" => {
            if report.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Console Replay Results\n\n_No checks executed._"
                )?;
            } else {
                common::reports::generate_markdown_report(&mut output_target, report)?;
            }
        }
        _ => {
            let duration = start_time.elapsed();
            if report.is_empty() {
                writeln!(&mut output_target, "No checks executed.")?;
            } else {
                common::reports::generate_console_report(&mut output_target, report, duration)?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
