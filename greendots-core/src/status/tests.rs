use crate::layout::{LayoutError, ProjectsRoot, RunDir};
use crate::status::{
    PollOutcome, StatusError, StatusMap, StatusPoller, aggregate_statuses, merge_record,
};
use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn obj(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

/// A run with `workers` empty shards.
fn run_fixture(workers: usize) -> (TempDir, RunDir) {
    let dir = tempfile::tempdir().unwrap();
    let run = ProjectsRoot::new(dir.path()).run("proj", "r1").unwrap();
    fs::create_dir_all(run.path()).unwrap();
    fs::write(
        run.plan_path(),
        json!({"worker_count": workers, "groups": {}}).to_string(),
    )
    .unwrap();
    for i in 0..workers {
        fs::write(run.shard_path(i), "").unwrap();
    }
    (dir, run)
}

fn append(run: &RunDir, shard: usize, data: &str) {
    let mut file = OpenOptions::new()
        .append(true)
        .open(run.shard_path(shard))
        .unwrap();
    file.write_all(data.as_bytes()).unwrap();
}

#[test]
fn later_record_replaces_earlier() {
    let mut records = StatusMap::new();

    assert!(merge_record(&mut records, obj(json!({"test": "a", "status": "running"}))));
    assert!(merge_record(&mut records, obj(json!({"test": "a", "status": "passed"}))));

    assert_eq!(records.len(), 1);
    assert_eq!(records["a"]["status"], "passed");
}

#[test]
fn exception_survives_a_later_null() {
    let mut records = StatusMap::new();

    merge_record(&mut records, obj(json!({"test": "a", "exception": "boom"})));
    merge_record(&mut records, obj(json!({"test": "a", "status": "failed", "exception": null})));
    merge_record(&mut records, obj(json!({"test": "a", "status": "failed"})));

    assert_eq!(records["a"]["exception"], "boom");
    assert_eq!(records["a"]["status"], "failed");
}

#[test]
fn newer_exception_wins() {
    let mut records = StatusMap::new();

    merge_record(&mut records, obj(json!({"test": "a", "exception": "first"})));
    merge_record(&mut records, obj(json!({"test": "a", "exception": "second"})));

    assert_eq!(records["a"]["exception"], "second");
}

#[test]
fn record_without_test_is_rejected() {
    let mut records = StatusMap::new();

    assert!(!merge_record(&mut records, obj(json!({"type": "progress", "percentage": 1.0}))));
    assert!(!merge_record(&mut records, obj(json!({"test": 7}))));
    assert!(records.is_empty());
}

#[tokio::test]
async fn aggregates_across_shards() {
    let (_dir, run) = run_fixture(2);
    let line0 = "{\"test\":\"a\",\"status\":\"running\"}\n";
    let line1 = "{\"test\":\"a\",\"status\":\"failed\",\"exception\":\"E\"}\n";
    let line2 = "{\"test\":\"b\",\"status\":\"passed\"}\n";
    append(&run, 0, line0);
    append(&run, 0, line1);
    append(&run, 1, line2);

    let summary = aggregate_statuses(&run).await.unwrap();

    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records["a"]["exception"], "E");
    assert_eq!(summary.records["b"]["status"], "passed");
    assert_eq!(
        summary.end_offsets,
        vec![(line0.len() + line1.len()) as u64, line2.len() as u64]
    );
}

#[tokio::test]
async fn stops_at_a_partial_trailing_line() {
    let (_dir, run) = run_fixture(1);
    let complete = "{\"test\":\"a\",\"status\":\"running\"}\n";
    append(&run, 0, complete);
    append(&run, 0, "{\"test\":\"a\",\"sta");

    let summary = aggregate_statuses(&run).await.unwrap();
    assert_eq!(summary.records["a"]["status"], "running");
    assert_eq!(summary.end_offsets, vec![complete.len() as u64]);

    // Once the writer finishes the line it is picked up from where we stopped.
    append(&run, 0, "tus\":\"passed\"}\n");
    let summary = aggregate_statuses(&run).await.unwrap();
    assert_eq!(summary.records["a"]["status"], "passed");
    assert_eq!(
        summary.end_offsets,
        vec![fs::metadata(run.shard_path(0)).unwrap().len()]
    );
}

#[tokio::test]
async fn complete_object_without_newline_is_not_consumed() {
    let (_dir, run) = run_fixture(1);
    append(&run, 0, "{\"test\":\"a\"}");

    let summary = aggregate_statuses(&run).await.unwrap();
    assert!(summary.records.is_empty());
    assert_eq!(summary.end_offsets, vec![0]);
}

#[tokio::test]
async fn blank_line_ends_a_shard() {
    let (_dir, run) = run_fixture(1);
    append(&run, 0, "{\"test\":\"a\"}\n\n{\"test\":\"b\"}\n");

    let summary = aggregate_statuses(&run).await.unwrap();
    assert!(summary.records.contains_key("a"));
    assert!(!summary.records.contains_key("b"));
    assert_eq!(summary.end_offsets, vec![13]);
}

#[tokio::test]
async fn crlf_bytes_count_towards_the_offset() {
    let (_dir, run) = run_fixture(1);
    append(&run, 0, "{\"test\":\"a\"}\r\n");

    let summary = aggregate_statuses(&run).await.unwrap();
    assert!(summary.records.contains_key("a"));
    assert_eq!(summary.end_offsets, vec![14]);
}

#[tokio::test]
async fn records_without_test_are_skipped_but_consumed() {
    let (_dir, run) = run_fixture(1);
    let progress = "{\"type\":\"progress\",\"percentage\":1.0}\n";
    let record = "{\"test\":\"a\"}\n";
    append(&run, 0, progress);
    append(&run, 0, record);

    let summary = aggregate_statuses(&run).await.unwrap();
    assert_eq!(summary.records.len(), 1);
    assert_eq!(summary.end_offsets, vec![(progress.len() + record.len()) as u64]);
}

#[tokio::test]
async fn aggregation_is_repeatable() {
    let (_dir, run) = run_fixture(2);
    append(&run, 0, "{\"test\":\"a\",\"exception\":\"E\"}\n{\"test\":\"a\"}\n");
    append(&run, 1, "{\"test\":\"b\"}\n");

    let first = aggregate_statuses(&run).await.unwrap();
    let second = aggregate_statuses(&run).await.unwrap();

    assert_eq!(first.records, second.records);
    assert_eq!(first.end_offsets, second.end_offsets);
}

#[tokio::test]
async fn missing_shard_is_not_found() {
    let (_dir, run) = run_fixture(2);
    fs::remove_file(run.shard_path(1)).unwrap();

    let err = aggregate_statuses(&run).await.unwrap_err();
    assert!(matches!(err, StatusError::Layout(LayoutError::NotFound { .. })));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn json_lines_hold_one_record_each() {
    let (_dir, run) = run_fixture(1);
    append(&run, 0, "{\"test\":\"a\"}\n{\"test\":\"b\"}\n");

    let summary = aggregate_statuses(&run).await.unwrap();
    let body = String::from_utf8(summary.to_json_lines().unwrap()).unwrap();

    let mut tests: Vec<String> = body
        .lines()
        .map(|l| serde_json::from_str::<Value>(l).unwrap()["test"].as_str().unwrap().to_string())
        .collect();
    tests.sort();
    assert_eq!(tests, vec!["a".to_string(), "b".to_string()]);
    assert!(body.ends_with('\n'));
}

fn quick_poller() -> StatusPoller {
    StatusPoller::with_intervals(Duration::from_millis(10), Duration::from_millis(200))
}

#[tokio::test]
async fn poll_reports_shards_already_ahead() {
    let (_dir, run) = run_fixture(3);
    append(&run, 2, "{\"test\":\"a\"}\n");

    let outcome = quick_poller()
        .wait(&run, &[0, 0, 0], std::future::pending())
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Changed(vec![2]));
}

#[tokio::test]
async fn poll_wakes_when_a_shard_grows() {
    let (_dir, run) = run_fixture(2);
    let writer_run = run.clone();

    let writer = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        append(&writer_run, 1, "{\"test\":\"a\"}\n");
    });

    let poller = StatusPoller::with_intervals(Duration::from_millis(10), Duration::from_secs(5));
    let started = Instant::now();
    let outcome = poller
        .wait(&run, &[0, 0], std::future::pending())
        .await
        .unwrap();
    writer.await.unwrap();

    assert_eq!(outcome, PollOutcome::Changed(vec![1]));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn poll_times_out_without_growth() {
    let (_dir, run) = run_fixture(1);
    append(&run, 0, "{\"test\":\"a\"}\n");
    let size = fs::metadata(run.shard_path(0)).unwrap().len();

    let started = Instant::now();
    let outcome = quick_poller()
        .wait(&run, &[size], std::future::pending())
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::TimedOut);
    assert!(started.elapsed() >= Duration::from_millis(200));
}

#[tokio::test]
async fn poll_stops_when_the_client_leaves() {
    let (_dir, run) = run_fixture(1);
    let poller = StatusPoller::with_intervals(Duration::from_millis(10), Duration::from_secs(30));

    let started = Instant::now();
    let outcome = poller
        .wait(&run, &[0], tokio::time::sleep(Duration::from_millis(30)))
        .await
        .unwrap();

    assert_eq!(outcome, PollOutcome::Disconnected);
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[tokio::test]
async fn poll_rejects_an_empty_request() {
    let (_dir, run) = run_fixture(1);

    let err = quick_poller()
        .wait(&run, &[], std::future::pending())
        .await
        .unwrap_err();

    assert!(matches!(err, StatusError::EmptyPoll));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn poll_on_a_missing_shard_is_not_found() {
    let (_dir, run) = run_fixture(1);

    let err = quick_poller()
        .wait(&run, &[0, 0], std::future::pending())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}
