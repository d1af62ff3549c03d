use crate::static_files::range::ByteRange;
use crate::static_files::{CachePolicy, NO_CACHE};
use http::{HeaderMap, HeaderName, HeaderValue, header};

#[derive(Debug, Default)]
pub(crate) struct HeaderBuilder {
    headers: HeaderMap,
}

impl HeaderBuilder {
    /// Insert a header; values that are not valid header text remove it instead.
    pub(crate) fn insert(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(v) if !v.is_empty() => {
                self.headers.insert(name, v);
            }
            _ => {
                self.headers.remove(name);
            }
        }
    }

    pub(crate) fn accept_ranges(&mut self) {
        self.insert(header::ACCEPT_RANGES, "bytes");
    }

    pub(crate) fn content_type(&mut self, value: &str) {
        self.insert(header::CONTENT_TYPE, value);
    }

    pub(crate) fn content_length(&mut self, len: u64) {
        self.insert(header::CONTENT_LENGTH, &len.to_string());
    }

    pub(crate) fn content_range(&mut self, range: ByteRange, size: u64) {
        self.insert(
            header::CONTENT_RANGE,
            &format!("bytes {}-{}/{}", range.start, range.end, size),
        );
    }

    pub(crate) fn unsatisfied_range(&mut self, size: u64) {
        self.insert(header::CONTENT_RANGE, &format!("bytes */{size}"));
    }

    pub(crate) fn content_encoding(&mut self, value: &str) {
        self.insert(header::CONTENT_ENCODING, value);
    }

    pub(crate) fn etag(&mut self, value: &str) {
        self.insert(header::ETAG, value);
    }

    pub(crate) fn last_modified(&mut self, value: &str) {
        self.insert(header::LAST_MODIFIED, value);
    }

    pub(crate) fn vary(&mut self) {
        self.insert(header::VARY, "Accept-Encoding");
    }

    pub(crate) fn cache_control(&mut self, policy: CachePolicy) {
        let value = match policy {
            CachePolicy::NoStore => NO_CACHE,
            CachePolicy::Immutable => "public, max-age=31536000, immutable",
        };
        self.insert(header::CACHE_CONTROL, value);
    }

    pub(crate) fn build(self) -> HeaderMap {
        self.headers
    }
}
