//! Suite report rendering and tracing setup.

use std::fmt::Write as _;

use crate::scenario::SuiteReport;

/// Renders suite outcomes for humans.
#[derive(Debug, Default)]
pub struct Reporter {
    /// Include per-scenario lines for passing scenarios too
    pub verbose: bool,
}

impl Reporter {
    /// Create a reporter with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Include passing scenarios in the rendering
    #[must_use]
    pub const fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Render a suite report as text.
    ///
    /// Failures always render with step index, description, and error
    /// detail; passing scenarios render one line each in verbose mode.
    #[must_use]
    pub fn render(&self, suite: &SuiteReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "suite '{}': {} passed, {} failed ({} scenarios in {:.2?})",
            suite.name,
            suite.passed_count(),
            suite.failed_count(),
            suite.reports.len(),
            suite.duration
        );
        for report in &suite.reports {
            if report.passed() {
                if self.verbose {
                    let _ = writeln!(
                        out,
                        "  PASS {} ({} steps, {:.2?})",
                        report.title, report.steps_run, report.duration
                    );
                }
            } else {
                let _ = writeln!(
                    out,
                    "  FAIL {} ({}/{} steps, {:.2?})",
                    report.title, report.steps_run, report.steps_total, report.duration
                );
                if let Some(failure) = &report.failure {
                    let _ = writeln!(out, "       {failure}");
                }
            }
        }
        out
    }
}

/// Install a `tracing` subscriber honoring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn install_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}
