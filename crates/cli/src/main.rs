//! send-slack-report - Main Entry Point
//!
//! Summarizes the Playwright JSON report of the timesheet E2E suite and posts
//! it to the Slack incoming webhook configured in the environment or `.env`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};

use timesheet_report::config::DEFAULT_MAX_CHUNK_CHARS;
use timesheet_report::{
    build_payload, load_env_file, DryRunNotifier, EnvSnapshot, Notifier, ProcessEnv, ReportError,
    Settings, WebhookNotifier, DEFAULT_ENV_PATH, DEFAULT_REPORT_PATH,
};

/// Post a Playwright run summary to Slack
#[derive(Parser, Debug)]
#[command(name = "send-slack-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Env file to load; keys already in the environment win
    #[arg(long, default_value = DEFAULT_ENV_PATH)]
    env_file: PathBuf,

    /// Playwright JSON report
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    report: PathBuf,

    /// Soft character ceiling for one table chunk
    #[arg(long, default_value_t = DEFAULT_MAX_CHUNK_CHARS)]
    max_chunk_chars: usize,

    /// Print the payload instead of posting it
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging on stderr, stdout is reserved for --dry-run
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // The env file must be applied before any other thread exists
    let assigned = load_env_file(&cli.env_file, &mut ProcessEnv)
        .with_context(|| format!("Failed to read {}", cli.env_file.display()))?;
    debug!("{} key(s) taken from {}", assigned, cli.env_file.display());

    let env = EnvSnapshot::from_process();
    let settings = Settings::from_env(&env).with_max_chunk_chars(cli.max_chunk_chars);

    let notifier: Box<dyn Notifier> = if cli.dry_run {
        Box::new(DryRunNotifier)
    } else {
        let url = settings
            .webhook_url
            .clone()
            .ok_or(ReportError::MissingWebhookUrl)?;
        Box::new(WebhookNotifier::new(url)?)
    };

    let payload = build_payload(&cli.report, &settings);
    info!(
        "Composed {} block(s) for {}",
        payload.blocks.len(),
        payload.text.lines().next().unwrap_or_default()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(notifier.send(&payload))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["send-slack-report"]);
        assert_eq!(cli.env_file, PathBuf::from(".env"));
        assert_eq!(cli.report, PathBuf::from("test-results/results.json"));
        assert_eq!(cli.max_chunk_chars, 2800);
        assert!(!cli.dry_run);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "send-slack-report",
            "--report",
            "out/results.json",
            "--max-chunk-chars",
            "1500",
            "--dry-run",
            "-v",
        ]);
        assert_eq!(cli.report, PathBuf::from("out/results.json"));
        assert_eq!(cli.max_chunk_chars, 1500);
        assert!(cli.dry_run);
        assert!(cli.verbose);
    }
}
