//! Output formatting for airsim-preflight.
//!
//! The terminal formatter lists checks in execution order followed by a
//! summary. Any report, including an empty one, produces valid output.

use crate::engine::result::ValidationReport;
use crate::CheckResult;

const RULE: &str = "--------------------------------------------------------------------------------";

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format a report into a string
    fn format(&self, report: &ValidationReport) -> String;
}

/// Terminal (human-readable) formatter
pub struct TerminalFormatter {
    color: bool,
    verbose: bool,
}

impl TerminalFormatter {
    pub fn new(color: bool, verbose: bool) -> Self {
        TerminalFormatter { color, verbose }
    }

    fn colorize(&self, text: &str, color_code: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", color_code, text)
        } else {
            text.to_string()
        }
    }

    fn status_tag(&self, result: Option<&CheckResult>) -> String {
        match result {
            Some(r @ CheckResult::Pass { .. }) => self.colorize(&format!("[{}]", r.label()), "32"),
            Some(r @ CheckResult::Warn { .. }) => self.colorize(&format!("[{}]", r.label()), "33"),
            Some(r @ CheckResult::Fail { .. }) => self.colorize(&format!("[{}]", r.label()), "31"),
            Some(r @ CheckResult::Skip { .. }) => self.colorize(&format!("[{}]", r.label()), "90"),
            None => self.colorize("[----]", "90"),
        }
    }

    fn describe(&self, result: Option<&CheckResult>) -> String {
        match result {
            Some(CheckResult::Pass { message, duration_ms }) => {
                if self.verbose {
                    format!("{} ({}ms)", message, duration_ms)
                } else {
                    message.clone()
                }
            }
            Some(CheckResult::Warn { message, details, duration_ms })
            | Some(CheckResult::Fail { message, details, duration_ms }) => {
                if self.verbose {
                    format!("{} - {} ({}ms)", message, details, duration_ms)
                } else {
                    message.clone()
                }
            }
            Some(CheckResult::Skip { reason }) => reason.clone(),
            None => "Not executed".to_string(),
        }
    }
}

impl OutputFormatter for TerminalFormatter {
    fn format(&self, report: &ValidationReport) -> String {
        let mut output = String::new();

        output.push_str(RULE);
        output.push('\n');
        output.push_str("airsim-preflight acceptance report\n");
        output.push_str(&format!(
            "Started: {}\n",
            report.timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        ));
        output.push_str(RULE);
        output.push('\n');

        for check in &report.checks {
            let result = check.result.as_ref();
            output.push_str(&format!(
                "  {} {:<8} {:<10} {}: {}\n",
                self.status_tag(result),
                check.id,
                check.category.to_string(),
                check.name,
                self.describe(result)
            ));
        }

        let summary = report.summary();
        output.push_str(RULE);
        output.push('\n');
        output.push_str(&format!(
            "SUMMARY: {} passed, {} warnings, {} failed, {} skipped\n",
            summary.passed, summary.warned, summary.failed, summary.skipped
        ));
        output.push_str(&format!(
            "Total time: {:.1}s\n",
            report.total_duration_ms as f64 / 1000.0
        ));
        output.push_str(RULE);

        output
    }
}
