use bytes::Bytes;

pub const START_MARKER: &str = "-- LOG START --\n";

pub const TRUNCATION_NOTICE: &str =
    "-- LOG TRUNCATED DUE TO LENGTH, <a href=log_stream?notrunc>Click here to keep going</a> --\n";

/// Replace every `<` with `&lt;` so raw log bytes cannot open a tag.
///
/// Operates on bytes; `<` never occurs inside a multi-byte UTF-8 sequence, so
/// chunk boundaries are irrelevant.
pub fn escape_lt(raw: &[u8]) -> Bytes {
    let extra = raw.iter().filter(|&&b| b == b'<').count();
    if extra == 0 {
        return Bytes::copy_from_slice(raw);
    }

    let mut out = Vec::with_capacity(raw.len() + extra * 3);
    for &b in raw {
        if b == b'<' {
            out.extend_from_slice(b"&lt;");
        } else {
            out.push(b);
        }
    }
    Bytes::from(out)
}
