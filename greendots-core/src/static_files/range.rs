#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64, // inclusive
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RangeRequest {
    /// No usable `Range` header; serve the whole file.
    Full,
    Partial(ByteRange),
    /// The range starts at or past the end of the file.
    Unsatisfiable,
}

/// Interpret a single-range `Range` header against a file of `size` bytes.
///
/// Multi-range and suffix (`bytes=-N`) requests are ignored. An end past the
/// file is clamped to its last byte.
pub(crate) fn parse_range_header(header: &str, size: u64) -> RangeRequest {
    let Some(spec) = header.trim().strip_prefix("bytes=") else {
        return RangeRequest::Full;
    };
    if spec.contains(',') {
        return RangeRequest::Full;
    }
    let Some((start, end)) = spec.split_once('-') else {
        return RangeRequest::Full;
    };
    let Ok(start) = start.trim().parse::<u64>() else {
        return RangeRequest::Full;
    };

    if start >= size {
        return RangeRequest::Unsatisfiable;
    }

    let end = match end.trim() {
        "" => size - 1,
        v => match v.parse::<u64>() {
            Ok(end) if end >= start => end.min(size - 1),
            _ => return RangeRequest::Full,
        },
    };

    RangeRequest::Partial(ByteRange { start, end })
}
