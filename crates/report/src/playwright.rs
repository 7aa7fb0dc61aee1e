//! Playwright JSON reporter output
//!
//! The raw document is decoded into optional-bearing structs and then
//! flattened into [`TestCase`] records. Nothing downstream of
//! [`flatten_suites`] sees the raw shape.

use std::fmt;
use std::path::Path;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

/// Root of `results.json`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonReport {
    #[serde(deserialize_with = "lenient_seq")]
    pub suites: Vec<JsonSuite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonSuite {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub file: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub line: Option<u32>,
    #[serde(deserialize_with = "lenient_seq")]
    pub suites: Vec<JsonSuite>,
    #[serde(deserialize_with = "lenient_seq")]
    pub specs: Vec<JsonSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonSpec {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub file: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub line: Option<u32>,
    #[serde(deserialize_with = "lenient_seq")]
    pub tests: Vec<JsonTest>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonTest {
    #[serde(deserialize_with = "lenient")]
    pub project_name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub results: Vec<JsonTestResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonTestResult {
    #[serde(deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_seq")]
    pub errors: Vec<JsonError>,
    #[serde(deserialize_with = "lenient")]
    pub error: Option<JsonError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonError {
    #[serde(deserialize_with = "lenient")]
    pub message: Option<String>,
}

/// A field of the wrong type (or `null`) falls back to its default instead of
/// failing the whole document.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Arrays are decoded element by element so one bad entry only defaults
/// itself. A non-array value yields an empty list.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Normalized outcome of a single test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

impl CaseStatus {
    /// Anything other than `passed` or `skipped` counts as a failure,
    /// including a missing status.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("passed") => CaseStatus::Passed,
            Some("skipped") => CaseStatus::Skipped,
            _ => CaseStatus::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Passed => "passed",
            CaseStatus::Failed => "failed",
            CaseStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flattened test outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub status: CaseStatus,
    /// Ancestor suite titles and the spec title joined by ` > `
    pub title: String,
    /// Relative path with forward slashes
    pub file: String,
    pub line: Option<u32>,
    pub project_name: Option<String>,
    /// First error message, collapsed to one line
    pub error: Option<String>,
}

/// Result of reading the report file
#[derive(Debug, Clone, Default)]
pub struct ReportLoad {
    pub cases: Vec<TestCase>,
    /// Set when the report was missing or could not be decoded
    pub warning: Option<String>,
}

/// Read and flatten the report at `path`.
///
/// A missing or malformed report yields no cases and a warning rather than
/// an error, so a notification can still be sent.
pub fn read_report(path: &Path) -> ReportLoad {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let warning = format!("Report file not found: {}", path.display());
            warn!("{}", warning);
            return ReportLoad { cases: Vec::new(), warning: Some(warning) };
        }
        Err(e) => return parse_warning(&e.to_string()),
    };

    match parse_report(&content) {
        Ok(report) => {
            let cases = flatten_suites(&report.suites);
            debug!("Read {} test case(s) from {}", cases.len(), path.display());
            ReportLoad { cases, warning: None }
        }
        Err(e) => parse_warning(&e.to_string()),
    }
}

fn parse_warning(message: &str) -> ReportLoad {
    let first_line = message.lines().next().unwrap_or_default();
    let warning = format!("Report parse warning: {}", first_line);
    warn!("{}", warning);
    ReportLoad { cases: Vec::new(), warning: Some(warning) }
}

pub fn parse_report(json: &str) -> serde_json::Result<JsonReport> {
    serde_json::from_str(json)
}

/// Inherited context for one suite on the walk stack
struct Frame<'a> {
    suite: &'a JsonSuite,
    path: Vec<&'a str>,
    file: Option<&'a str>,
    line: Option<u32>,
}

/// Flatten the suite tree into test cases, depth-first pre-order.
///
/// A suite's own specs are emitted before its nested suites. Uses an explicit
/// stack so arbitrarily deep trees cannot overflow.
pub fn flatten_suites(suites: &[JsonSuite]) -> Vec<TestCase> {
    let mut cases = Vec::new();
    let mut stack: Vec<Frame<'_>> = suites
        .iter()
        .rev()
        .map(Frame::root)
        .collect();

    while let Some(frame) = stack.pop() {
        for spec in &frame.suite.specs {
            emit_spec(spec, &frame, &mut cases);
        }

        for child in frame.suite.suites.iter().rev() {
            stack.push(frame.child(child));
        }
    }

    cases
}

impl<'a> Frame<'a> {
    fn root(suite: &'a JsonSuite) -> Self {
        let mut path = Vec::new();
        push_title(&mut path, suite.title.as_deref());
        Self {
            suite,
            path,
            file: non_empty(suite.file.as_deref()),
            line: suite.line,
        }
    }

    fn child(&self, suite: &'a JsonSuite) -> Self {
        let mut path = self.path.clone();
        push_title(&mut path, suite.title.as_deref());
        Self {
            suite,
            path,
            file: non_empty(suite.file.as_deref()).or(self.file),
            line: suite.line.or(self.line),
        }
    }
}

fn push_title<'a>(path: &mut Vec<&'a str>, title: Option<&'a str>) {
    if let Some(title) = non_empty(title) {
        path.push(title);
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn emit_spec(spec: &JsonSpec, frame: &Frame<'_>, cases: &mut Vec<TestCase>) {
    let spec_title = non_empty(spec.title.as_deref());

    let mut segments = frame.path.clone();
    if let Some(title) = spec_title {
        segments.push(title);
    }
    let title = if segments.is_empty() {
        "Unnamed test".to_string()
    } else {
        segments.join(" > ")
    };

    let file = non_empty(spec.file.as_deref())
        .or(frame.file)
        .map(normalize_path)
        .unwrap_or_default();
    let line = spec.line.or(frame.line);

    for test in &spec.tests {
        let final_result = test.results.last();
        cases.push(TestCase {
            status: CaseStatus::from_raw(final_result.and_then(|r| r.status.as_deref())),
            title: title.clone(),
            file: file.clone(),
            line,
            project_name: test.project_name.clone(),
            error: final_result.and_then(first_error),
        });
    }
}

/// `errors[].message` takes precedence over `error.message`
fn first_error(result: &JsonTestResult) -> Option<String> {
    result
        .errors
        .iter()
        .filter_map(|e| e.message.as_deref())
        .chain(result.error.as_ref().and_then(|e| e.message.as_deref()))
        .map(collapse_lines)
        .find(|m| !m.is_empty())
}

fn collapse_lines(message: &str) -> String {
    message.replace(['\r', '\n'], " ").trim().to_string()
}

/// Forward slashes, no leading `./`
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut trimmed = path.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}
