use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};
use crate::sink::StreamSink;
use crate::static_files::{ConditionalHeaders, ServeOptions, render_file};
use crate::status::{PollOutcome, PollResponse, StatusError, aggregate_statuses};
use bytes::{Bytes, BytesMut};
use http::{StatusCode, header};

/// Upper bound on a poll body; a few bytes per worker.
const MAX_POLL_BODY: usize = 64 * 1024;

pub(super) async fn plan(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
) -> Result<(), RequestError> {
    let run = state.root.run(project, run)?;
    let conditional = ConditionalHeaders::from_headers(&ex.session().req_header().headers);

    let resp = render_file(
        &run.plan_path(),
        &conditional,
        &ServeOptions::api_data("application/json"),
    )
    .await?;
    ex.send_static(resp).await
}

pub(super) async fn summary(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
) -> Result<(), RequestError> {
    let run = state.root.run(project, run)?;
    let summary = aggregate_statuses(&run).await?;

    let mut resp = ex.header(StatusCode::OK)?;
    resp.insert_header(header::CONTENT_TYPE, "application/jsonl")?;
    for offset in &summary.end_offsets {
        resp.append_header("X-End-Offset", offset.to_string())?;
    }

    let body = summary.to_json_lines()?;
    ex.send_with(resp, Bytes::from(body)).await
}

pub(super) async fn poll(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
) -> Result<(), RequestError> {
    // The body is validated before the path, so a malformed poll is a 400 even
    // for a run that does not exist.
    let body = read_body(ex).await?;
    let expected: Vec<u64> = serde_json::from_slice(&body).map_err(RequestError::BadPollBody)?;
    if expected.is_empty() {
        return Err(StatusError::EmptyPoll.into());
    }

    let run_dir = state.root.run(project, run)?;

    let outcome = {
        let mut sink = ex.sink();
        state
            .poller
            .wait(&run_dir, &expected, sink.closed())
            .await?
    };

    match outcome {
        PollOutcome::Changed(workers_to_check) => {
            ex.send_json(StatusCode::OK, &PollResponse { workers_to_check })
                .await
        }
        PollOutcome::TimedOut => {
            tracing::debug!(project, run, "status poll timed out");
            let resp = ex.header(StatusCode::NO_CONTENT)?;
            ex.start(resp, true).await
        }
        PollOutcome::Disconnected => {
            ex.abandon();
            Ok(())
        }
    }
}

pub(super) async fn stream(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
    worker: &str,
) -> Result<(), RequestError> {
    let path = state.root.run(project, run)?.worker_shard_path(worker)?;
    let conditional = ConditionalHeaders::from_headers(&ex.session().req_header().headers);

    let resp = render_file(
        &path,
        &conditional,
        &ServeOptions::api_data("application/jsonl"),
    )
    .await?;
    ex.send_static(resp).await
}

async fn read_body(ex: &mut Exchange<'_>) -> Result<Bytes, RequestError> {
    let session = ex.session();
    let mut body = BytesMut::new();

    while let Some(chunk) = session.read_request_body().await? {
        if body.len() + chunk.len() > MAX_POLL_BODY {
            return Err(RequestError::BodyTooLarge {
                limit: MAX_POLL_BODY,
            });
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body.freeze())
}
