//! Terminal output for command results

use console::{style, Term};
use stepwright::{RunMode, ScenarioReport};

use crate::config::CliConfig;

/// Writes status lines to stdout
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Reporter honouring the CLI color and verbosity settings
    #[must_use]
    pub fn from_config(config: &CliConfig) -> Self {
        Self::new(config.color.should_color(), config.verbosity.is_quiet())
    }

    fn prefix(&self, symbol: &'static str, plain: &'static str, paint: fn(&'static str) -> String) -> String {
        if self.use_color {
            paint(symbol)
        } else {
            plain.to_string()
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", |s| style(s).green().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // failures print even in quiet mode
        let prefix = self.prefix("✗", "FAIL", |s| style(s).red().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("⚠", "WARN", |s| style(s).yellow().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", |s| style(s).blue().bold().to_string());
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a plain line, unless quiet
    pub fn line(&self, message: &str) {
        if !self.quiet {
            let _ = self.term.write_line(message);
        }
    }

    /// Print a scenario report
    pub fn report(&self, report: &ScenarioReport) {
        let summary = report_summary(report);
        if report.is_success() {
            self.success(&summary);
        } else {
            self.failure(&summary);
            if let Some(failure) = &report.failure {
                let _ = self.term.write_line(&format!("  {failure}"));
            }
        }
        if let Some(path) = &report.artifact_path {
            self.info(&format!("artifact saved to {}", path.display()));
        }
    }
}

/// One-line outcome of a scenario run
#[must_use]
pub fn report_summary(report: &ScenarioReport) -> String {
    let mode = match report.mode {
        Some(RunMode::CachedReplay) => "replayed",
        Some(RunMode::LiveTranslation) => "translated",
        None => "not started",
    };
    format!(
        "{} ({mode}): {} steps, {} actions, {} model calls in {} ms",
        report.test_name,
        report.steps_executed,
        report.actions_executed,
        report.translator_calls,
        report.duration_ms
    )
}
