use integration_tests::harness::{RunFixture, TestServer, log_line};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use reqwest::blocking::Response;
use std::io::Read;
use std::time::{Duration, Instant};

const TEST: &str = "tests/test_mod.py::test_a";
const TEST_ENCODED: &str = "tests%2Ftest_mod.py%3A%3Atest_a";
const NOON: f64 = 1_704_110_400.0;

fn log_url(leaf: &str) -> String {
    format!("/api/v1/projects/demo/runs/r1/test/{TEST_ENCODED}/{leaf}")
}

fn run_with_log(srv: &TestServer, messages: &[&str]) -> RunFixture {
    let run = RunFixture::create(srv.root(), "demo", "r1", 1);
    for (i, message) in messages.iter().enumerate() {
        run.append_log(TEST, &log_line("INFO", "app", message, NOON + i as f64));
    }
    run
}

/// Read from a streaming response until `needle` shows up.
fn read_until(res: &mut Response, seen: &mut String, needle: &str) {
    let deadline = Instant::now() + Duration::from_secs(4);
    let mut buf = [0u8; 4096];

    while !seen.contains(needle) {
        assert!(Instant::now() < deadline, "never saw {needle:?} in {seen:?}");
        let n = res.read(&mut buf).unwrap();
        assert!(n > 0, "stream ended before {needle:?}");
        seen.push_str(&String::from_utf8_lossy(&buf[..n]));
    }
}

#[test]
fn tail_returns_the_last_lines() {
    let srv = TestServer::start();
    run_with_log(&srv, &["first", "second", "third", "fourth"]);

    let res = srv.get(&log_url("log_tail?lines=2")).send().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html");

    let body = res.text().unwrap();
    assert!(body.contains("<pre>"));
    assert!(body.contains("<span class=l>app</span> third\n"));
    assert!(body.contains("<span class=l>app</span> fourth\n"));
    assert!(!body.contains("second"));
    assert!(!body.contains("-- LOG START --"));
}

#[test]
fn tail_of_whole_file_marks_the_start() {
    let srv = TestServer::start();
    run_with_log(&srv, &["only"]);

    let body = srv.get(&log_url("log_tail")).send().unwrap().text().unwrap();
    assert!(body.contains("-- LOG START --\n"));
    assert!(body.contains(" only\n"));
}

#[test]
fn tail_rejects_a_non_numeric_line_count() {
    let srv = TestServer::start();
    run_with_log(&srv, &["x"]);

    let res = srv.get(&log_url("log_tail?lines=ten")).send().unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn missing_log_is_not_found() {
    let srv = TestServer::start();
    RunFixture::create(srv.root(), "demo", "r1", 1);

    for leaf in ["log_tail", "log_stream"] {
        let res = srv.get(&log_url(leaf)).send().unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{leaf}");
    }
}

#[test]
fn stream_is_truncated_past_the_limit() {
    let srv = TestServer::start_with(|cfg| cfg.status_stream.log_truncation_size = 1);
    run_with_log(&srv, &["too long already"]);

    let res = srv.get(&log_url("log_stream")).send().unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().unwrap();
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("-- LOG START --\n"));
    assert!(body.contains("-- LOG TRUNCATED DUE TO LENGTH, <a href=log_stream?notrunc>"));
    assert!(!body.contains("too long already"));
}

#[test]
fn stream_follows_appended_lines() {
    let srv = TestServer::start();
    let run = run_with_log(&srv, &["before"]);

    let mut res = srv.get(&log_url("log_stream?notrunc")).send().unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut seen = String::new();
    read_until(&mut res, &mut seen, " before\n");

    run.append_log(TEST, &log_line("ERROR", "app", "after <b>", NOON + 10.0));
    read_until(&mut res, &mut seen, " after &lt;b>\n");

    assert!(seen.contains("<span class=\"e l-app\">"));
}

#[test]
fn stream_holds_back_a_partial_line() {
    let srv = TestServer::start();
    let run = run_with_log(&srv, &["whole"]);
    run.append_log(TEST, "{\"level\": \"INFO\", \"message\": \"hal");

    let mut res = srv.get(&log_url("log_stream?notrunc")).send().unwrap();
    let mut seen = String::new();
    read_until(&mut res, &mut seen, " whole\n");
    assert!(!seen.contains("hal"));

    run.append_log(TEST, "f\", \"name\": \"app\", \"time\": 1704110405}\n");
    read_until(&mut res, &mut seen, " half\n");
}

#[test]
fn head_on_a_stream_sends_headers_only() {
    let srv = TestServer::start();
    run_with_log(&srv, &["x"]);

    let res = srv.head(&log_url("log_stream")).send().unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html");
    assert_eq!(res.text().unwrap(), "");
}
