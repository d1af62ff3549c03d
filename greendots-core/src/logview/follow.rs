use crate::assets;
use crate::format::{LevelTable, LineFormatter};
use crate::logview::markup::{START_MARKER, TRUNCATION_NOTICE, escape_lt};
use crate::sink::StreamSink;
use bytes::Bytes;
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Chunks in flight between the file reader and the formatter.
const CHUNK_QUEUE_DEPTH: usize = 1;

/// Chunks an unterminated line may span before it is emitted in pieces.
const MAX_LINE_CHUNKS: usize = 16;

#[derive(Debug, Clone)]
pub struct FollowSettings {
    pub chunk_size: usize,
    pub eof_sleep: Duration,
    /// Formatted bytes after which the stream is cut; `None` never cuts.
    pub truncate_after: Option<usize>,
}

/// Why a follow session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowEnd {
    Disconnected,
    Truncated,
    /// The file could no longer be read.
    SourceFailed,
}

/// Stream a log file to `sink` from its first byte, waiting at EOF for the
/// producer to append more.
///
/// Runs until the client disconnects, the output passes the truncation
/// threshold, or the file fails to read. The background reader is always
/// stopped and joined before this returns.
pub async fn follow_log<S>(
    file: File,
    sink: &mut S,
    levels: &LevelTable,
    settings: &FollowSettings,
) -> FollowEnd
where
    S: StreamSink + ?Sized,
{
    if sink.send(assets::logs_view_prefix()).await.is_err()
        || sink.send(Bytes::from_static(START_MARKER.as_bytes())).await.is_err()
    {
        return FollowEnd::Disconnected;
    }

    let cancel = CancellationToken::new();
    // Stops the reader even when this future is dropped mid-stream.
    let _reader_guard = cancel.clone().drop_guard();
    let (tx, mut rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);
    let chunk_size = settings.chunk_size.max(1);
    let reader = tokio::spawn(read_chunks(
        file,
        chunk_size,
        settings.eof_sleep,
        tx,
        cancel.clone(),
    ));

    let mut writer = LineWriter {
        sink,
        formatter: LineFormatter::new(levels),
        written: 0,
        truncate_after: settings.truncate_after,
        max_line: chunk_size.saturating_mul(MAX_LINE_CHUNKS),
    };
    let end = writer.pump(&mut rx).await;

    cancel.cancel();
    drop(rx);
    if let Err(err) = reader.await {
        tracing::warn!(error = %err, "log reader task failed");
    }

    tracing::debug!(end = ?end, bytes = writer.written, "log follow ended");
    end
}

/// Read `file` forever, forwarding `<`-escaped chunks. Sleeps at EOF.
async fn read_chunks(
    mut file: File,
    chunk_size: usize,
    eof_sleep: Duration,
    tx: mpsc::Sender<Bytes>,
    cancel: CancellationToken,
) {
    let mut buf = vec![0u8; chunk_size];

    loop {
        let read = match file.read(&mut buf).await {
            Ok(read) => read,
            Err(err) => {
                tracing::warn!(error = %err, "log read failed");
                return;
            }
        };

        if read == 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = sleep(eof_sleep) => continue,
            }
        }

        let chunk = escape_lt(&buf[..read]);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = tx.send(chunk) => {
                if sent.is_err() {
                    return;
                }
            }
        }
    }
}

struct LineWriter<'a, S: ?Sized> {
    sink: &'a mut S,
    formatter: LineFormatter<'a>,
    written: usize,
    truncate_after: Option<usize>,
    /// Longest unterminated line held back before it is emitted anyway.
    max_line: usize,
}

impl<S> LineWriter<'_, S>
where
    S: StreamSink + ?Sized,
{
    async fn pump(&mut self, rx: &mut mpsc::Receiver<Bytes>) -> FollowEnd {
        let mut pending: Vec<u8> = Vec::new();

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.sink.closed() => return FollowEnd::Disconnected,
                chunk = rx.recv() => chunk,
            };

            let Some(chunk) = chunk else {
                // Reader gave up; whatever is buffered is the last line.
                if let ControlFlow::Break(end) = self.emit(&pending).await {
                    return end;
                }
                return FollowEnd::SourceFailed;
            };
            // Bytes already in `pending` hold no newline.
            let mut scan = pending.len();
            pending.extend_from_slice(&chunk);

            let mut start = 0;
            while let Some(pos) = pending[scan..].iter().position(|&b| b == b'\n') {
                let line = &pending[start..scan + pos];
                start = scan + pos + 1;
                scan = start;

                if let ControlFlow::Break(end) = self.emit(line).await {
                    return end;
                }
            }
            pending.drain(..start);

            if self.overlong(pending.len()) {
                if let ControlFlow::Break(end) = self.emit(&pending).await {
                    return end;
                }
                pending.clear();
            }
        }
    }

    /// Whether an unterminated line must be emitted now. Past the truncation
    /// threshold it could never be shown whole anyway.
    fn overlong(&self, len: usize) -> bool {
        len > self.max_line || self.truncate_after.is_some_and(|limit| len > limit)
    }

    /// Format and send one line. Flushes per line so a slow producer's output
    /// shows up immediately.
    async fn emit(&mut self, line: &[u8]) -> ControlFlow<FollowEnd> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() {
            return ControlFlow::Continue(());
        }

        let html = self.formatter.format(&String::from_utf8_lossy(line));
        self.written += html.len();

        if self.truncate_after.is_some_and(|limit| self.written > limit) {
            let notice = Bytes::from_static(TRUNCATION_NOTICE.as_bytes());
            return match self.sink.send(notice).await {
                Ok(()) => ControlFlow::Break(FollowEnd::Truncated),
                Err(_) => ControlFlow::Break(FollowEnd::Disconnected),
            };
        }

        match self.sink.send(Bytes::from(html)).await {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(FollowEnd::Disconnected),
        }
    }
}
