//! Binary-level checks: exit codes, stderr, env file precedence
//!
//! The binary runs with a cleared environment against a local hook so no
//! ambient CI variables or proxies leak in.

use std::path::PathBuf;
use std::process::Output;

use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::sync::mpsc;

const PASSING_REPORT: &str = r#"{
    "suites": [{
        "title": "login/TS-13165-Login with valid credentials.spec.js",
        "file": "login/TS-13165-Login with valid credentials.spec.js",
        "specs": [{
            "title": "Login with valid credentials",
            "tests": [{"projectName": "chrome", "results": [{"status": "passed"}]}]
        }]
    }]
}"#;

/// Local webhook answering every POST with `status` and `reply`
async fn spawn_hook(status: StatusCode, reply: &'static str) -> (String, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/services/T000/B000/XXXX",
        post(move |body: String| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
                (status, reply)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/services/T000/B000/XXXX", addr), rx)
}

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self { dir: TempDir::new().unwrap() }
    }

    fn env_file(&self) -> PathBuf {
        self.dir.path().join(".env")
    }

    fn report(&self) -> PathBuf {
        self.dir.path().join("results.json")
    }

    fn write_env(&self, content: &str) {
        std::fs::write(self.env_file(), content).unwrap();
    }

    fn write_report(&self, content: &str) {
        std::fs::write(self.report(), content).unwrap();
    }
}

async fn run(ws: &Workspace, env: &[(&str, &str)], extra_args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_send-slack-report"));
    cmd.env_clear()
        .arg("--env-file")
        .arg(ws.env_file())
        .arg("--report")
        .arg(ws.report())
        .args(extra_args)
        .current_dir(ws.dir.path());
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().await.unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn assert_exit(output: &Output, code: i32) {
    assert_eq!(output.status.code(), Some(code), "stderr: {}", stderr(output));
}

#[tokio::test(flavor = "multi_thread")]
async fn non_2xx_exits_with_status_and_body() {
    let (url, _rx) = spawn_hook(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);

    let output = run(&ws, &[("SLACK_WEBHOOK_URL", url.as_str())], &[]).await;

    assert_exit(&output, 1);
    assert!(stderr(&output).contains("Slack send failed: 500 boom"));
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_post_exits_zero() {
    let (url, mut rx) = spawn_hook(StatusCode::OK, "ok").await;
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);

    let output = run(&ws, &[("SLACK_WEBHOOK_URL", url.as_str())], &[]).await;

    assert_exit(&output, 0);
    let body: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert!(body["text"].as_str().unwrap().starts_with("Playwright run: PASSED"));
    assert_eq!(body["blocks"][0]["type"], "section");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_webhook_url_is_fatal() {
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);

    let output = run(&ws, &[], &[]).await;

    assert_exit(&output, 1);
    assert!(stderr(&output).contains("SLACK_WEBHOOK_URL is missing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn env_file_supplies_webhook_and_outcome() {
    let (url, mut rx) = spawn_hook(StatusCode::OK, "ok").await;
    let ws = Workspace::new();
    ws.write_env(&format!("# slack\nSLACK_WEBHOOK_URL=\"{}\"\nPLAYWRIGHT_OUTCOME=success\n", url));

    // no report on disk, the outcome from .env decides the verdict
    let output = run(&ws, &[], &[]).await;

    assert_exit(&output, 0);
    let body: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.starts_with("Playwright run: PASSED"));
    assert!(text.contains("Report file not found: "));
}

#[tokio::test(flavor = "multi_thread")]
async fn process_env_beats_env_file() {
    let (url, mut rx) = spawn_hook(StatusCode::OK, "ok").await;
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);
    ws.write_env(&format!("SLACK_WEBHOOK_URL={}\nGITHUB_REF_NAME=from-file\n", url));

    let output = run(&ws, &[("GITHUB_REF_NAME", "from-env")], &[]).await;

    assert_exit(&output, 0);
    let body: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert!(body["text"].as_str().unwrap().contains("Branch: from-env"));
}

#[tokio::test(flavor = "multi_thread")]
async fn dry_run_prints_payload_without_webhook() {
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);

    let output = run(&ws, &[], &["--dry-run"]).await;

    assert_exit(&output, 0);
    let payload: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["text"].as_str().unwrap().lines().next(), Some("Playwright run: PASSED"));
    assert!(payload["blocks"].as_array().unwrap().len() >= 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_utf8_in_env_file_is_not_fatal() {
    let (url, mut rx) = spawn_hook(StatusCode::OK, "ok").await;
    let ws = Workspace::new();
    ws.write_report(PASSING_REPORT);
    let mut content = format!("SLACK_WEBHOOK_URL={}\n", url).into_bytes();
    content.extend_from_slice(b"# caf\xe9\n");
    std::fs::write(ws.env_file(), content).unwrap();

    let output = run(&ws, &[], &[]).await;

    assert_exit(&output, 0);
    assert!(rx.recv().await.is_some());
}
