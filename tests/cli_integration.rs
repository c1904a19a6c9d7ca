use serde_json::Value;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

use crumb::assistant::AUTH_FALLBACK;

/// A loopback URL that refuses connections, so page fetches fail fast and
/// the assistant falls back to its built-in site description.
fn refused_source_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let addr = listener.local_addr().expect("address should be available");
    drop(listener);
    format!("http://{addr}/")
}

fn run_one_shot(log_output: &str, log_format: &str, log_file_path: Option<&Path>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_crumb"));
    cmd.arg("What is Datacrumbs?")
        .env("MODEL_PROVIDER", "gemini")
        .env("SOURCE_URLS", refused_source_url())
        .env("FETCH_TIMEOUT_SECS", "1")
        .env("RUST_LOG", "crumb=info")
        .env("LOG_OUTPUT", log_output)
        .env("LOG_FORMAT", log_format)
        .env_remove("GEMINI_API_KEY")
        .env_remove("GROQ_API_KEY");

    if let Some(path) = log_file_path {
        cmd.env("LOG_FILE_PATH", path);
    } else {
        cmd.env_remove("LOG_FILE_PATH");
    }

    cmd.output().expect("failed to run crumb binary")
}

fn unique_temp_dir(suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "crumb-cli-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}

fn find_rotated_log_file(dir: &Path, base_file_name: &str) -> PathBuf {
    let expected_prefix = format!("{base_file_name}.");
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .expect("failed to read temp directory")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(&expected_prefix))
                .unwrap_or(false)
        })
        .collect();

    matches.sort();
    matches
        .pop()
        .expect("expected a rotated log file to be created")
}

#[test]
fn one_shot_answers_with_auth_fallback_when_key_is_missing() {
    let output = run_one_shot("stderr", "pretty", None);
    assert!(
        output.status.success(),
        "model failures should degrade, not fail the command: {output:?}"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(AUTH_FALLBACK),
        "expected auth fallback reply on stdout, got:\n{stdout}"
    );
    // Raw provider errors stay in the logs, never in the answer.
    assert!(
        !stdout.contains("GEMINI_API_KEY"),
        "raw error text leaked into the answer:\n{stdout}"
    );
}

#[test]
fn json_format_emits_json_log_lines_on_stderr() {
    let output = run_one_shot("stderr", "json", None);
    assert!(output.status.success(), "command should succeed: {output:?}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_lines: Vec<&str> = stderr
        .lines()
        .filter(|line| line.trim_start().starts_with('{'))
        .collect();
    assert!(
        !json_lines.is_empty(),
        "expected at least one JSON log line, got stderr:\n{stderr}"
    );

    let parsed: Vec<Value> = json_lines
        .iter()
        .map(|line| serde_json::from_str::<Value>(line).expect("line should be valid JSON"))
        .collect();
    assert!(
        parsed.iter().any(|entry| {
            entry
                .get("fields")
                .and_then(|fields| fields.get("message"))
                .and_then(Value::as_str)
                == Some("loaded runtime configuration")
        }),
        "expected startup log message in JSON output, got stderr:\n{stderr}"
    );
}

#[test]
fn file_output_writes_logs_to_rotated_file() {
    let dir = unique_temp_dir("file");
    let log_path = dir.join("crumb.log");
    let output = run_one_shot("file", "pretty", Some(&log_path));
    assert!(output.status.success(), "command should succeed: {output:?}");

    let rotated = find_rotated_log_file(&dir, "crumb.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("loaded runtime configuration"),
        "did not expect normal logs on stderr for file-only mode:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn both_output_writes_logs_to_stderr_and_file() {
    let dir = unique_temp_dir("both");
    let log_path = dir.join("crumb.log");
    let output = run_one_shot("both", "pretty", Some(&log_path));
    assert!(output.status.success(), "command should succeed: {output:?}");

    let rotated = find_rotated_log_file(&dir, "crumb.log");
    let file_contents = fs::read_to_string(&rotated).expect("failed to read rotated log file");
    assert!(
        file_contents.contains("loaded runtime configuration"),
        "expected startup log message in file, got:\n{file_contents}"
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("loaded runtime configuration"),
        "expected startup log message on stderr, got:\n{stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}
