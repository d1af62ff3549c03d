use crate::static_files::compression::Encoding;
use crate::static_files::etag::{etag_matches, modified_since};
use crate::static_files::range::{ByteRange, RangeRequest, parse_range_header};
use crate::static_files::{
    CachePolicy, ConditionalHeaders, NO_CACHE, ServeError, ServeOptions, StaticBody,
    render_file, resolve_static_path,
};
use http::{StatusCode, header};
use pretty_assertions::assert_eq;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;

async fn body_bytes(body: StaticBody) -> Vec<u8> {
    match body {
        StaticBody::Empty => Vec::new(),
        StaticBody::Bytes(bytes) => bytes.to_vec(),
        StaticBody::File { file, remaining } => {
            let mut out = Vec::new();
            file.take(remaining).read_to_end(&mut out).await.unwrap();
            out
        }
    }
}

fn fixture(name: &str, contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    (dir, path)
}

fn with_range(range: &str) -> ConditionalHeaders {
    ConditionalHeaders {
        range: Some(range.to_string()),
        ..Default::default()
    }
}

fn shard_opts() -> ServeOptions {
    ServeOptions::api_data("application/jsonl")
}

#[test]
fn range_header_forms() {
    assert_eq!(
        parse_range_header("bytes=5-", 10),
        RangeRequest::Partial(ByteRange { start: 5, end: 9 })
    );
    assert_eq!(
        parse_range_header("bytes=2-4", 10),
        RangeRequest::Partial(ByteRange { start: 2, end: 4 })
    );
    assert_eq!(
        parse_range_header("bytes=2-400", 10),
        RangeRequest::Partial(ByteRange { start: 2, end: 9 })
    );
    assert_eq!(parse_range_header("bytes=10-", 10), RangeRequest::Unsatisfiable);
    assert_eq!(parse_range_header("bytes=0-", 0), RangeRequest::Unsatisfiable);
    assert_eq!(parse_range_header("bytes=4-2", 10), RangeRequest::Full);
    assert_eq!(parse_range_header("bytes=-3", 10), RangeRequest::Full);
    assert_eq!(parse_range_header("bytes=0-1,4-5", 10), RangeRequest::Full);
    assert_eq!(parse_range_header("items=0-1", 10), RangeRequest::Full);
}

#[test]
fn etag_comparison_is_weak() {
    let etag = "W/\"a-b\"";
    assert!(etag_matches(etag, "\"a-b\""));
    assert!(etag_matches(etag, "\"x\", W/\"a-b\""));
    assert!(etag_matches(etag, "*"));
    assert!(!etag_matches(etag, "\"a-c\""));
}

#[test]
fn modified_since_has_second_resolution() {
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let header = httpdate::fmt_http_date(base);

    assert!(!modified_since(Some(base + Duration::from_millis(500)), &header));
    assert!(modified_since(Some(base + Duration::from_secs(2)), &header));
    assert!(modified_since(None, &header));
    assert!(modified_since(Some(base), "garbage"));
}

#[test]
fn encoding_negotiation() {
    assert_eq!(Encoding::negotiate("gzip, br"), Some(Encoding::Brotli));
    assert_eq!(Encoding::negotiate("gzip;q=1.0, br;q=0.5"), Some(Encoding::Gzip));
    assert_eq!(Encoding::negotiate("br;q=0, gzip"), Some(Encoding::Gzip));
    assert_eq!(Encoding::negotiate("identity"), None);
}

#[tokio::test]
async fn whole_file_with_overridden_type() {
    let (_dir, path) = fixture("status.0.jsonl", b"{\"test\":\"a\"}\n");

    let resp = render_file(&path, &ConditionalHeaders::default(), &shard_opts())
        .await
        .unwrap();

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers[header::CONTENT_TYPE], "application/jsonl");
    assert_eq!(resp.headers[header::CACHE_CONTROL], NO_CACHE);
    assert_eq!(resp.headers[header::CONTENT_LENGTH], "13");
    assert_eq!(resp.headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(body_bytes(resp.body).await, b"{\"test\":\"a\"}\n");
}

#[tokio::test]
async fn open_ended_range_resumes_at_offset() {
    let (_dir, path) = fixture("status.0.jsonl", b"0123456789");

    let resp = render_file(&path, &with_range("bytes=4-"), &shard_opts())
        .await
        .unwrap();

    assert_eq!(resp.status, StatusCode::PARTIAL_CONTENT);
    assert_eq!(resp.headers[header::CONTENT_RANGE], "bytes 4-9/10");
    assert_eq!(resp.headers[header::CONTENT_LENGTH], "6");
    assert_eq!(body_bytes(resp.body).await, b"456789");
}

#[tokio::test]
async fn range_past_the_end_is_unsatisfiable() {
    let (_dir, path) = fixture("status.0.jsonl", b"0123456789");

    let resp = render_file(&path, &with_range("bytes=10-"), &shard_opts())
        .await
        .unwrap();

    assert_eq!(resp.status, StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(resp.headers[header::CONTENT_RANGE], "bytes */10");
    assert!(matches!(resp.body, StaticBody::Empty));
}

#[tokio::test]
async fn growth_after_open_is_not_served() {
    let (_dir, path) = fixture("status.0.jsonl", b"first\n");

    let resp = render_file(&path, &with_range("bytes=0-"), &shard_opts())
        .await
        .unwrap();

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"second\n").unwrap();

    assert_eq!(resp.headers[header::CONTENT_LENGTH], "6");
    assert_eq!(body_bytes(resp.body).await, b"first\n");
}

#[tokio::test]
async fn matching_etag_is_not_modified() {
    let (_dir, path) = fixture("plan.json", b"{}");

    let first = render_file(&path, &ConditionalHeaders::default(), &shard_opts())
        .await
        .unwrap();
    let etag = first.headers[header::ETAG].to_str().unwrap().to_string();

    let conditional = ConditionalHeaders {
        if_none_match: Some(etag),
        ..Default::default()
    };
    let resp = render_file(&path, &conditional, &shard_opts()).await.unwrap();

    assert_eq!(resp.status, StatusCode::NOT_MODIFIED);
    assert!(matches!(resp.body, StaticBody::Empty));
}

#[tokio::test]
async fn frontend_text_is_compressed_when_accepted() {
    let (_dir, path) = fixture("app.js", "console.log('greendots');\n".repeat(200).as_bytes());
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip".to_string()),
        ..Default::default()
    };

    let resp = render_file(&path, &conditional, &ServeOptions::frontend(CachePolicy::Immutable))
        .await
        .unwrap();

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.headers[header::CONTENT_ENCODING], "gzip");
    assert_eq!(resp.headers[header::VARY], "Accept-Encoding");
    assert!(
        resp.headers[header::CACHE_CONTROL]
            .to_str()
            .unwrap()
            .contains("immutable")
    );

    let compressed = body_bytes(resp.body).await;
    let mut decoded = String::new();
    std::io::Read::read_to_string(&mut flate2::read::GzDecoder::new(&compressed[..]), &mut decoded)
        .unwrap();
    assert!(decoded.starts_with("console.log"));
}

#[tokio::test]
async fn api_data_is_never_compressed() {
    let (_dir, path) = fixture("plan.json", "{\"a\": 1}\n".repeat(500).as_bytes());
    let conditional = ConditionalHeaders {
        accept_encoding: Some("gzip, br".to_string()),
        ..Default::default()
    };

    let resp = render_file(&path, &conditional, &ServeOptions::api_data("application/json"))
        .await
        .unwrap();

    assert!(resp.headers.get(header::CONTENT_ENCODING).is_none());
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = render_file(
        &dir.path().join("nope.json"),
        &ConditionalHeaders::default(),
        &shard_opts(),
    )
    .await
    .err()
    .unwrap();

    assert!(matches!(err, ServeError::NotFound));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

fn frontend_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("assets")).unwrap();
    fs::write(dir.path().join("assets").join("index-abc.js"), "x").unwrap();
    fs::write(dir.path().join("secret.txt"), "s").unwrap();
    dir
}

#[test]
fn resolves_files_inside_the_base() {
    let dir = frontend_dir();
    let assets = dir.path().join("assets");

    let path = resolve_static_path(&assets, "index-abc.js").unwrap();
    assert!(path.ends_with(Path::new("assets/index-abc.js")));

    let path = resolve_static_path(&assets, "/index%2Dabc.js").unwrap();
    assert!(path.ends_with("index-abc.js"));
}

#[test]
fn refuses_to_leave_the_base() {
    let dir = frontend_dir();
    let assets = dir.path().join("assets");

    assert!(matches!(
        resolve_static_path(&assets, "../secret.txt"),
        Err(ServeError::Forbidden)
    ));
    assert!(matches!(
        resolve_static_path(&assets, "%2E%2E/secret.txt"),
        Err(ServeError::Forbidden)
    ));
    assert!(matches!(
        resolve_static_path(&assets, "missing.js"),
        Err(ServeError::NotFound)
    ));
    assert!(matches!(
        resolve_static_path(&assets, ""),
        Err(ServeError::NotFound)
    ));
}
