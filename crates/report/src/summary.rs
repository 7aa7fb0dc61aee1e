//! Outcome totals and the overall run verdict

use std::fmt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::playwright::{CaseStatus, ReportLoad, TestCase};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Totals {
    pub fn from_cases(cases: &[TestCase]) -> Self {
        let mut totals = Self::default();
        for case in cases {
            totals.record(case.status);
        }
        totals
    }

    pub fn record(&mut self, status: CaseStatus) {
        match status {
            CaseStatus::Passed => self.passed += 1,
            CaseStatus::Failed => self.failed += 1,
            CaseStatus::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn count(&self, status: CaseStatus) -> usize {
        match status {
            CaseStatus::Passed => self.passed,
            CaseStatus::Failed => self.failed,
            CaseStatus::Skipped => self.skipped,
        }
    }
}

/// Everything known about one run after the report has been read
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cases: Vec<TestCase>,
    pub totals: Totals,
    pub status: RunStatus,
    pub warning: Option<String>,
}

impl RunSummary {
    pub fn new(cases: Vec<TestCase>, warning: Option<String>, outcome: Option<&str>) -> Self {
        let totals = Totals::from_cases(&cases);
        let status = RunStatus::derive(&totals, outcome);
        debug!(
            "Totals: {} passed, {} failed, {} skipped -> {}",
            totals.passed, totals.failed, totals.skipped, status
        );
        Self {
            cases,
            totals,
            status,
            warning,
        }
    }

    pub fn from_load(load: ReportLoad, outcome: Option<&str>) -> Self {
        Self::new(load.cases, load.warning, outcome)
    }
}

/// Verdict for the whole invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Passed,
    Failed,
    Unknown,
}

impl RunStatus {
    /// Derive the verdict from the totals, using the CI-supplied outcome as a
    /// tie-breaker. Rules are checked in order:
    ///
    /// 1. any failed test
    /// 2. outcome `failure` / `failed`
    /// 3. any passed test
    /// 4. outcome `success` / `passed`
    /// 5. otherwise unknown
    pub fn derive(totals: &Totals, outcome: Option<&str>) -> Self {
        let outcome = outcome.map(|o| o.trim().to_lowercase());
        let outcome = outcome.as_deref();

        if totals.failed > 0 || matches!(outcome, Some("failure" | "failed")) {
            RunStatus::Failed
        } else if totals.passed > 0 || matches!(outcome, Some("success" | "passed")) {
            RunStatus::Passed
        } else {
            RunStatus::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "PASSED",
            RunStatus::Failed => "FAILED",
            RunStatus::Unknown => "UNKNOWN",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RunStatus::Passed => "✅",
            RunStatus::Failed => "❌",
            RunStatus::Unknown => "⚠️",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
