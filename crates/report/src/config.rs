//! Notifier settings resolved from the environment snapshot

use crate::env::EnvSnapshot;

pub const WEBHOOK_URL_KEY: &str = "SLACK_WEBHOOK_URL";
pub const DETAIL_LIMIT_KEY: &str = "SLACK_TEST_DETAIL_LIMIT";
pub const OUTCOME_KEY: &str = "PLAYWRIGHT_OUTCOME";
pub const RUN_NUMBER_KEY: &str = "GITHUB_RUN_NUMBER";
pub const REPOSITORY_KEY: &str = "GITHUB_REPOSITORY";
pub const REF_NAME_KEY: &str = "GITHUB_REF_NAME";
pub const RUN_ID_KEY: &str = "GITHUB_RUN_ID";

pub const DEFAULT_DETAIL_LIMIT: usize = 20;
/// Slack rejects section text above 3000 characters
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 2800;

/// Everything the summarizer needs from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Incoming webhook target
    pub webhook_url: Option<String>,

    /// Maximum table rows per outcome class
    pub detail_limit: usize,

    /// Verdict supplied by the CI harness, lowercased
    pub outcome: Option<String>,

    /// Soft ceiling for a single table chunk
    pub max_chunk_chars: usize,

    pub ci: CiContext,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            detail_limit: DEFAULT_DETAIL_LIMIT,
            outcome: None,
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            ci: CiContext::default(),
        }
    }
}

impl Settings {
    pub fn from_env(env: &EnvSnapshot) -> Self {
        Self {
            webhook_url: env.non_empty(WEBHOOK_URL_KEY).map(String::from),
            detail_limit: parse_detail_limit(env.get(DETAIL_LIMIT_KEY)),
            outcome: env.non_empty(OUTCOME_KEY).map(str::to_lowercase),
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            ci: CiContext::from_env(env),
        }
    }

    pub fn with_max_chunk_chars(mut self, max_chunk_chars: usize) -> Self {
        self.max_chunk_chars = max_chunk_chars;
        self
    }
}

/// Positive integer, anything else falls back to the default
fn parse_detail_limit(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_DETAIL_LIMIT)
}

/// GitHub Actions run metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiContext {
    pub run_number: Option<String>,
    pub repository: Option<String>,
    pub ref_name: Option<String>,
    pub run_id: Option<String>,
}

impl CiContext {
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let get = |key: &str| env.non_empty(key).map(String::from);
        Self {
            run_number: get(RUN_NUMBER_KEY),
            repository: get(REPOSITORY_KEY),
            ref_name: get(REF_NAME_KEY),
            run_id: get(RUN_ID_KEY),
        }
    }

    pub fn run_url(&self) -> Option<String> {
        match (&self.repository, &self.run_id) {
            (Some(repo), Some(id)) => Some(format!("https://github.com/{}/actions/runs/{}", repo, id)),
            _ => None,
        }
    }

    /// ` #N` when a run number is known
    pub fn run_number_suffix(&self) -> String {
        self.run_number
            .as_ref()
            .map(|n| format!(" #{}", n))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, 20 ; "unset")]
    #[test_case(Some("5"), 5 ; "positive")]
    #[test_case(Some(" 7 "), 7 ; "padded")]
    #[test_case(Some("0"), 20 ; "zero")]
    #[test_case(Some("-3"), 20 ; "negative")]
    #[test_case(Some("ten"), 20 ; "not a number")]
    fn test_detail_limit(raw: Option<&str>, expected: usize) {
        assert_eq!(parse_detail_limit(raw), expected);
    }

    #[test]
    fn test_from_env_reads_all_keys() {
        let env = EnvSnapshot::new()
            .with(WEBHOOK_URL_KEY, "https://hooks.example/T/B")
            .with(OUTCOME_KEY, "FAILURE")
            .with(RUN_NUMBER_KEY, "42")
            .with(REPOSITORY_KEY, "acme/timesheet-e2e")
            .with(REF_NAME_KEY, "main")
            .with(RUN_ID_KEY, "9001");

        let settings = Settings::from_env(&env);
        assert_eq!(settings.webhook_url.as_deref(), Some("https://hooks.example/T/B"));
        assert_eq!(settings.outcome.as_deref(), Some("failure"));
        assert_eq!(settings.detail_limit, DEFAULT_DETAIL_LIMIT);
        assert_eq!(settings.ci.run_number_suffix(), " #42");
        assert_eq!(
            settings.ci.run_url().as_deref(),
            Some("https://github.com/acme/timesheet-e2e/actions/runs/9001")
        );
    }

    #[test]
    fn test_run_url_needs_repository_and_id() {
        let ci = CiContext {
            repository: Some("acme/repo".into()),
            ..Default::default()
        };
        assert_eq!(ci.run_url(), None);
        assert_eq!(ci.run_number_suffix(), "");
    }

    #[test]
    fn test_empty_webhook_is_absent() {
        let env = EnvSnapshot::new().with(WEBHOOK_URL_KEY, "");
        assert_eq!(Settings::from_env(&env).webhook_url, None);
    }
}
