use crate::assets;
use crate::format::{LevelTable, LineFormatter};
use crate::logview::markup::{START_MARKER, escape_lt};
use bytes::{BufMut, Bytes, BytesMut};
use std::collections::VecDeque;
use std::io::SeekFrom;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};

/// Last lines of a log that may still be growing.
///
/// Only the final `window_bytes` of the file are scanned; on a file longer
/// than that the first line read is almost certainly cut and is dropped.
#[derive(Debug)]
pub struct TailReader<'a> {
    levels: &'a LevelTable,
    window_bytes: u64,
}

impl<'a> TailReader<'a> {
    pub fn new(levels: &'a LevelTable, window_bytes: u64) -> Self {
        Self {
            levels,
            window_bytes,
        }
    }

    /// The last `line_count` formatted entries, oldest first. The start marker
    /// comes first, outside the count, when every line since the top of the
    /// file fits in the window.
    pub async fn read(&self, mut file: File, line_count: usize) -> std::io::Result<Vec<String>> {
        let len = file.metadata().await?.len();
        let start = len.saturating_sub(self.window_bytes);
        file.seek(SeekFrom::Start(start)).await?;

        let mut window = Window::new(line_count);
        let mut reader = BufReader::new(file);
        let mut line = Vec::new();

        if start > 0 {
            reader.read_until(b'\n', &mut line).await?;
        }

        let mut formatter = LineFormatter::new(self.levels);
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }

            let raw = line.strip_suffix(b"\n").unwrap_or(&line[..]);
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            if raw.is_empty() {
                continue;
            }

            let escaped = escape_lt(raw);
            window.push(formatter.format(&String::from_utf8_lossy(&escaped)));
        }

        let mut lines = Vec::with_capacity(window.lines.len() + 1);
        if start == 0 && !window.evicted {
            lines.push(START_MARKER.to_string());
        }
        lines.extend(window.lines);
        Ok(lines)
    }
}

/// Complete tail page: both wrappers followed by the lines.
pub fn render_tail(lines: &[String]) -> Bytes {
    let tail_prefix = assets::tail_view_prefix();
    let view_prefix = assets::logs_view_prefix();

    let size = tail_prefix.len() + view_prefix.len() + lines.iter().map(String::len).sum::<usize>();
    let mut out = BytesMut::with_capacity(size);
    out.put_slice(&tail_prefix);
    out.put_slice(&view_prefix);
    for line in lines {
        out.put_slice(line.as_bytes());
    }
    out.freeze()
}

struct Window {
    capacity: usize,
    lines: VecDeque<String>,
    /// Set once any line has been dropped to make room.
    evicted: bool,
}

impl Window {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity.min(1024)),
            evicted: false,
        }
    }

    fn push(&mut self, line: String) {
        if self.capacity == 0 {
            self.evicted = true;
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.evicted = true;
        }
        self.lines.push_back(line);
    }
}
