//! Module / test-case id / title extraction from spec file paths
//!
//! Spec files follow `<module>/TS-<digits>-<title>.spec.js`, for example
//! `login/TS-13165-Login with valid credentials.spec.js`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder for a value that could not be parsed
pub const UNPARSEABLE: &str = "--";

static SOURCE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\.spec)?\.[cm]?[jt]sx?$").expect("valid suffix regex"));

static TEST_CASE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)TS-\d+").expect("valid test case id regex"));

static SEPARATOR_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_-]+").expect("valid separator regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMetadata {
    pub module_name: String,
    pub test_case_id: String,
    pub title: String,
}

impl TestMetadata {
    /// Parse a normalized (forward-slash) relative path
    pub fn from_path(file: &str) -> Self {
        let segments: Vec<&str> = file.split('/').collect();

        let module_name = segments
            .first()
            .map(|s| title_case(s.trim()))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNPARSEABLE.to_string());

        let terminal = segments.last().copied().unwrap_or_default();
        let base_name = SOURCE_SUFFIX.replace(terminal, "");

        let (test_case_id, raw_title) = match TEST_CASE_ID.find(&base_name) {
            Some(m) => (
                m.as_str().to_uppercase(),
                base_name[m.end()..]
                    .trim_start_matches(|c: char| c == '-' || c == '_' || c.is_whitespace())
                    .to_string(),
            ),
            None => (UNPARSEABLE.to_string(), base_name.to_string()),
        };

        let title = SEPARATOR_RUN.replace_all(&raw_title, " ").trim().to_string();
        let title = if title.is_empty() { UNPARSEABLE.to_string() } else { title };

        Self {
            module_name,
            test_case_id,
            title,
        }
    }
}

/// Upper-case the first character, leave the rest alone
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
