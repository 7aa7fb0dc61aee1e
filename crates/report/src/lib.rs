//! Timesheet E2E Run Reporting
//!
//! This crate turns the Playwright JSON report of a timesheet E2E run into a
//! Slack notification:
//! - Loads `.env` without overriding the existing environment
//! - Reads and flattens `test-results/results.json`
//! - Counts outcomes and derives the run verdict
//! - Renders per-outcome tables sized for Slack sections
//! - Posts the message to an incoming webhook
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 send-slack-report (binary)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  env::load_env_file(.env) -> EnvSnapshot -> Settings        │
//! │  playwright::read_report(path) -> ReportLoad                │
//! │    └── flatten_suites(suites) -> [TestCase]                 │
//! │  summary::RunSummary                                        │
//! │    ├── Totals { passed, failed, skipped }                   │
//! │    └── RunStatus { PASSED | FAILED | UNKNOWN }              │
//! │  message::compose(summary, settings) -> Payload             │
//! │    └── table::TableBuilder (metadata::TestMetadata)         │
//! │  webhook::Notifier::send(payload)                           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod env;
pub mod error;
pub mod message;
pub mod metadata;
pub mod playwright;
pub mod summary;
pub mod table;
pub mod webhook;

use std::path::Path;

pub use config::{CiContext, Settings};
pub use env::{load_env_file, EnvSnapshot, EnvTarget, ProcessEnv};
pub use error::{ReportError, ReportResult};
pub use message::{compose, Block, Payload};
pub use playwright::{read_report, CaseStatus, ReportLoad, TestCase};
pub use summary::{RunStatus, RunSummary, Totals};
pub use webhook::{DryRunNotifier, Notifier, WebhookNotifier};

/// Default location of the env file, relative to the project root
pub const DEFAULT_ENV_PATH: &str = ".env";

/// Where the Playwright JSON reporter writes its output
pub const DEFAULT_REPORT_PATH: &str = "test-results/results.json";

/// Read the report and compose the notification. Never fails: report
/// problems end up as a warning inside the payload.
pub fn build_payload(report_path: &Path, settings: &Settings) -> Payload {
    let load = read_report(report_path);
    let summary = RunSummary::from_load(load, settings.outcome.as_deref());
    compose(&summary, settings)
}
