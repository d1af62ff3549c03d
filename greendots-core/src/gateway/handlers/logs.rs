use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};
use crate::logview::{FollowEnd, TailReader, follow_log, open_log, render_tail};
use http::{StatusCode, header};

const HTML: &str = "text/html";

pub(super) async fn stream(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
    test: &str,
    truncate: bool,
) -> Result<(), RequestError> {
    let path = state.root.run(project, run)?.log_path(test)?;
    let file = open_log(&path).await?;

    let mut resp = ex.header(StatusCode::OK)?;
    resp.insert_header(header::CONTENT_TYPE, HTML)?;
    resp.insert_header(header::TRANSFER_ENCODING, "chunked")?;
    ex.start(resp, false).await?;
    if ex.is_head() {
        return Ok(());
    }

    tracing::debug!(project, run, test, truncate, "log follow started");
    let settings = state.follow_settings(truncate);
    let end = {
        let mut sink = ex.sink();
        follow_log(file, &mut sink, &state.levels, &settings).await
    };

    match end {
        FollowEnd::Disconnected => {
            ex.abandon();
            Ok(())
        }
        FollowEnd::Truncated | FollowEnd::SourceFailed => ex.finish().await,
    }
}

pub(super) async fn tail(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
    run: &str,
    test: &str,
    lines: Option<&str>,
) -> Result<(), RequestError> {
    let line_count = match lines.filter(|raw| !raw.is_empty()) {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| RequestError::BadLineCount(raw.to_string()))?,
        None => state.config.log_tail.default_line_count,
    };

    let path = state.root.run(project, run)?.log_path(test)?;
    let file = open_log(&path).await?;

    let lines = TailReader::new(&state.levels, state.config.log_tail.window_bytes)
        .read(file, line_count)
        .await
        .map_err(|source| RequestError::Io {
            what: "test log",
            source,
        })?;

    ex.send(StatusCode::OK, HTML, render_tail(&lines)).await
}
