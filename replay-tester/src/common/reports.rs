use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::results::{FlowResult, RunReport, SuiteResult};

pub fn generate_console_report(
    w: &mut dyn Write,
    report: &RunReport,
    total_duration: Duration,
) -> Result<()> {
    writeln!(w)?;
    writeln!(w, "{}", "📊 Test Results Summary".bright_cyan().bold())?;
    writeln!(w, "{}", "======================".cyan())?;

    let total = report.suites.len() + report.api.len();
    let passed = report.suites.iter().filter(|r| r.passed).count()
        + report.api.iter().filter(|r| r.passed).count();
    let failed = total - passed;

    writeln!(w, "Total checks: {total}")?;
    writeln!(w, "Passed: {}", passed.to_string().green())?;
    writeln!(w, "Failed: {}", failed.to_string().red())?;
    #[allow(clippy::cast_precision_loss)]
    let success_rate = if total == 0 {
        0.0
    } else {
        (passed as f64 / total as f64) * 100.0
    };
    writeln!(w, "Success rate: {success_rate:.1}%")?;
    writeln!(w, "Total time: {total_duration:?}")?;
    writeln!(w)?;

    for result in &report.suites {
        write_suite_console(w, result)?;
    }
    for flow in &report.api {
        write_flow_console(w, flow)?;
    }
    Ok(())
}

fn write_suite_console(w: &mut dyn Write, result: &SuiteResult) -> Result<()> {
    let status = if result.passed {
        "✅ PASS".green()
    } else {
        "❌ FAIL".red()
    };
    writeln!(w, "{} {} [{}]", status, result.suite.bold(), result.browser)?;
    if result.aborted {
        writeln!(w, "   {}", "No START/STOP control found, nothing replayed".yellow())?;
    }
    writeln!(
        w,
        "   Rounds: {}  Scenarios: {}  Shoe changes: {}",
        result.rounds, result.scenarios_executed, result.shoe_changes
    )?;
    if result.skipped_resets > 0 {
        writeln!(
            w,
            "   {}",
            format!("Reset input missing on {} shoe change(s)", result.skipped_resets).yellow()
        )?;
    }
    writeln!(w, "   Attempts: {}  Time: {:?}", result.attempts, result.duration)?;
    if !result.failures.is_empty() {
        writeln!(w, "   Failures:")?;
        for failure in &result.failures {
            writeln!(w, "     • {}", failure.red())?;
        }
    }
    writeln!(w)?;
    Ok(())
}

fn write_flow_console(w: &mut dyn Write, flow: &FlowResult) -> Result<()> {
    let status = if flow.passed {
        "✅ PASS".green()
    } else {
        "❌ FAIL".red()
    };
    writeln!(w, "{} api {}", status, flow.flow.bold())?;
    if !flow.detail.is_empty() {
        writeln!(w, "   {}", flow.detail)?;
    }
    for call in &flow.requests {
        let status = call
            .status
            .map_or_else(|| "---".to_string(), |code| code.to_string());
        writeln!(w, "   {} {} {} ({} ms)", call.method, call.url, status, call.ms)?;
    }
    writeln!(w)?;
    Ok(())
}

pub fn generate_json_report(w: &mut dyn Write, report: &RunReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(w, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(w: &mut dyn Write, report: &RunReport) -> Result<()> {
    writeln!(w, "# Console Replay Results\n")?;

    let total = report.suites.len() + report.api.len();
    let passed = report.suites.iter().filter(|r| r.passed).count()
        + report.api.iter().filter(|r| r.passed).count();

    writeln!(w, "## Summary\n")?;
    writeln!(w, "- **Total checks**: {total}")?;
    writeln!(w, "- **Passed**: {passed}")?;
    writeln!(w, "- **Failed**: {}\n", total - passed)?;

    if !report.suites.is_empty() {
        writeln!(w, "## Replay Suites\n")?;
        writeln!(
            w,
            "| | Suite | Browser | Rounds | Scenarios | Shoe changes | Skipped resets | Attempts |"
        )?;
        writeln!(w, "|---|---|---|---|---|---|---|---|")?;
        for result in &report.suites {
            let status = if result.passed { "✅" } else { "❌" };
            writeln!(
                w,
                "| {status} | {} | {} | {} | {} | {} | {} | {} |",
                result.suite,
                result.browser,
                result.rounds,
                result.scenarios_executed,
                result.shoe_changes,
                result.skipped_resets,
                result.attempts
            )?;
        }
        writeln!(w)?;
        for result in report.suites.iter().filter(|r| !r.failures.is_empty()) {
            writeln!(w, "### {} ({})\n", result.suite, result.browser)?;
            for failure in &result.failures {
                writeln!(w, "- {failure}")?;
            }
            writeln!(w)?;
        }
    }

    if !report.api.is_empty() {
        writeln!(w, "## API Flows\n")?;
        for flow in &report.api {
            let status = if flow.passed { "✅" } else { "❌" };
            writeln!(w, "### {status} {}\n", flow.flow)?;
            if !flow.detail.is_empty() {
                writeln!(w, "{}\n", flow.detail)?;
            }
            for call in &flow.requests {
                writeln!(w, "- `{} {}` {} ms", call.method, call.url, call.ms)?;
            }
            writeln!(w)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::results::RequestTiming;

    fn sample_report() -> RunReport {
        RunReport {
            suites: vec![SuiteResult {
                suite: "dt-tie".into(),
                browser: "chrome".into(),
                passed: false,
                attempts: 3,
                rounds: 1,
                scenarios_executed: 20,
                shoe_changes: 0,
                skipped_resets: 1,
                aborted: false,
                failures: vec!["round 1 scenario 21: driver action failed".into()],
                duration: Duration::from_secs(4),
            }],
            api: vec![FlowResult {
                flow: "login".into(),
                passed: true,
                detail: "token cached".into(),
                requests: vec![RequestTiming {
                    method: "POST".into(),
                    url: "http://api.test/Public/login".into(),
                    status: Some(200),
                    ms: 42,
                }],
                duration: Duration::from_millis(42),
            }],
        }
    }

    #[test]
    fn markdown_lists_suites_and_flows() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &sample_report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("# Console Replay Results"));
        assert!(text.contains("| ❌ | dt-tie | chrome | 1 | 20 | 0 | 1 | 3 |"));
        assert!(text.contains("round 1 scenario 21"));
        assert!(text.contains("`POST http://api.test/Public/login` 42 ms"));
    }

    #[test]
    fn console_report_counts_both_kinds() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(&mut out, &sample_report(), Duration::from_secs(5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total checks: 2"));
        assert!(text.contains("Success rate: 50.0%"));
        assert!(text.contains("api login"));
        assert!(text.contains("Reset input missing on 1 shoe change(s)"));
    }

    #[test]
    fn json_report_is_parseable() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["suites"][0]["suite"], "dt-tie");
        assert_eq!(value["api"][0]["requests"][0]["ms"], 42);
    }
}
