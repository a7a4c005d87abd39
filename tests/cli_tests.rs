// tests/cli_tests.rs
use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const TWO_ENTRIES: &str = "tests/fixtures/two_entries.ndjson";
const EMPTY: &str = "tests/fixtures/empty.ndjson";
const BAD_USER_DATA: &str = "tests/fixtures/bad_user_data.ndjson";

fn logq() -> Command {
    let mut cmd = Command::cargo_bin("logq").unwrap();
    cmd.env_remove("LOGQ_API_KEY")
        .env_remove("LOGQ_REGION")
        .env_remove("LOGQ_ENDPOINT")
        .env_remove("LOGQ_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_replay_body_only_yaml() {
    logq()
        .arg("--replay")
        .arg(TWO_ENTRIES)
        .arg("--body-only")
        .assert()
        .success()
        .stdout("- body: GET /health 200\n- body: job failed\n");
}

#[test]
fn test_replay_empty_results_json() {
    logq()
        .args(["--replay", EMPTY, "--format", "json"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_replay_from_stdin() {
    logq()
        .args(["--replay", "-", "--format", "json", "--metadata"])
        .write_stdin(std::fs::read_to_string(TWO_ENTRIES).unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"metadata\""))
        .stdout(predicate::str::contains("\"labels\"").not());
}

#[test]
fn test_replay_bad_user_data_fails_without_output() {
    logq()
        .args(["--replay", BAD_USER_DATA])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("userData of result 0"));
}

#[test]
fn test_single_frame_is_malformed() {
    let mut body = NamedTempFile::new().unwrap();
    writeln!(body, "{{\"result\":{{\"results\":[]}}}}").unwrap();

    logq()
        .arg("--replay")
        .arg(body.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing result frame"));
}

#[test]
fn test_output_file_written() {
    let out = NamedTempFile::new().unwrap();
    logq()
        .args(["--replay", TWO_ENTRIES, "--body-only", "--format", "json", "-o"])
        .arg(out.path())
        .assert()
        .success()
        .stdout("");

    let written = std::fs::read_to_string(out.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{"body": "GET /health 200"}, {"body": "job failed"}])
    );
}

#[test]
fn test_dry_run_prints_request() {
    logq()
        .args([
            "source logs | limit 10",
            "--dry-run",
            "--tier",
            "archive",
            "--start",
            "2024-05-01T00:00:00Z",
            "--end",
            "2024-05-02T00:00:00Z",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"query\": \"source logs | limit 10\""))
        .stdout(predicate::str::contains("\"tier\": \"TIER_ARCHIVE\""))
        .stdout(predicate::str::contains(
            "\"startDate\": \"2024-05-01T00:00:00.000Z\"",
        ));
}

#[test]
fn test_dry_run_query_from_file() {
    let mut query = NamedTempFile::new().unwrap();
    writeln!(query, "source logs | filter $d.status == 500").unwrap();

    logq()
        .arg("--dry-run")
        .arg("-f")
        .arg(query.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("$d.status == 500"))
        .stdout(predicate::str::contains("metadata").not());
}

#[test]
fn test_query_and_file_conflict() {
    logq()
        .args(["source logs", "-f", "query.dp", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Cannot use both --file"));
}

#[test]
fn test_missing_query() {
    logq()
        .arg("--dry-run")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Must provide either --file"));
}

#[test]
fn test_missing_api_key() {
    logq()
        .arg("source logs")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("Error: No API key"));
}

#[test]
fn test_invalid_format_rejected() {
    logq()
        .args(["--replay", EMPTY, "--format", "csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("csv"));
}

#[test]
fn test_unreachable_endpoint_reported() {
    // Nothing listens on the discard port
    logq()
        .args([
            "source logs",
            "--api-key",
            "k",
            "--endpoint",
            "http://127.0.0.1:9/api/v1/dataprime/query",
            "--timeout",
            "2s",
        ])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Request failed"));
}

/// Serve one HTTP response on a local port and return the query URL
fn serve_once(status: &'static str, body: &'static str) -> (String, std::thread::JoinHandle<()>) {
    use std::io::Read;

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/v1/dataprime/query", listener.local_addr().unwrap());

    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&request);
            if let Some(split) = text.find("\r\n\r\n") {
                let content_length = text[..split]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if request.len() >= split + 4 + content_length {
                    break;
                }
            }
        }
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
    });

    (url, handle)
}

#[test]
fn test_server_error_status_reported() {
    let (url, server) = serve_once("500 Internal Server Error", "query engine unavailable");

    logq()
        .args(["source logs", "--api-key", "k", "--endpoint", url.as_str()])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains(
            "Query API returned 500: query engine unavailable",
        ));

    server.join().unwrap();
}

#[test]
fn test_live_response_is_reshaped() {
    let (url, server) = serve_once(
        "200 OK",
        "{\"queryId\":{\"queryId\":\"q-live\"}}\n{\"result\":{\"results\":[{\"userData\":\"{\\\"body\\\":\\\"live\\\"}\"}]}}\n",
    );

    logq()
        .args(["source logs", "--api-key", "k", "--endpoint", url.as_str(), "--body-only"])
        .assert()
        .success()
        .stdout("- body: live\n");

    server.join().unwrap();
}
