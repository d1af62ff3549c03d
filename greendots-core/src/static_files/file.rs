use crate::static_files::compression::{Encoding, MIN_COMPRESS_SIZE, is_compressible_mime};
use crate::static_files::etag::{etag_matches, generate_etag, modified_since};
use crate::static_files::headers::HeaderBuilder;
use crate::static_files::range::{RangeRequest, parse_range_header};
use crate::static_files::{ConditionalHeaders, ServeError, ServeOptions, StaticBody, StaticResponse};
use bytes::Bytes;
use http::StatusCode;
use httpdate::fmt_http_date;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

/// Files up to this size are read into memory (and may be compressed).
const SMALL_FILE_THRESHOLD: u64 = 64 * 1024; // 64 KiB

/// Build the response for one file.
///
/// The file is opened first and every length below comes from that handle, so
/// a file that is appended to concurrently is served as the snapshot it was at
/// open time.
pub async fn render_file(
    path: &Path,
    conditional: &ConditionalHeaders,
    opts: &ServeOptions,
) -> Result<StaticResponse, ServeError> {
    let mut file = fs::File::open(path).await.map_err(ServeError::from_open)?;
    let metadata = file.metadata().await.map_err(ServeError::from_open)?;

    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let size = metadata.len();
    let modified = metadata.modified().ok();
    let etag = generate_etag(size, modified);

    let not_modified = match (
        conditional.if_none_match.as_deref(),
        conditional.if_modified_since.as_deref(),
    ) {
        (Some(inm), _) => etag_matches(&etag, inm),
        (None, Some(ims)) => !modified_since(modified, ims),
        _ => false,
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let compressible = opts.compress && is_compressible_mime(&mime) && size >= MIN_COMPRESS_SIZE;

    let mut headers = HeaderBuilder::default();
    headers.accept_ranges();
    headers.content_type(opts.content_type.unwrap_or(mime.as_ref()));
    headers.etag(&etag);
    if let Some(modified) = modified {
        headers.last_modified(&fmt_http_date(modified));
    }
    if compressible {
        headers.vary();
    }
    headers.cache_control(opts.cache);

    if not_modified {
        headers.content_length(0);
        return Ok(StaticResponse {
            status: StatusCode::NOT_MODIFIED,
            headers: headers.build(),
            body: StaticBody::Empty,
        });
    }

    let encoding = if compressible && size <= SMALL_FILE_THRESHOLD {
        conditional
            .accept_encoding
            .as_deref()
            .and_then(Encoding::negotiate)
    } else {
        None
    };

    // Ranges address the identity encoding only.
    let range = match (encoding, conditional.range.as_deref()) {
        (None, Some(header)) => parse_range_header(header, size),
        _ => RangeRequest::Full,
    };

    match range {
        RangeRequest::Unsatisfiable => {
            headers.unsatisfied_range(size);
            headers.content_length(0);
            Ok(StaticResponse {
                status: StatusCode::RANGE_NOT_SATISFIABLE,
                headers: headers.build(),
                body: StaticBody::Empty,
            })
        }

        RangeRequest::Partial(range) => {
            file.seek(SeekFrom::Start(range.start)).await?;

            headers.content_range(range, size);
            headers.content_length(range.len());
            Ok(StaticResponse {
                status: StatusCode::PARTIAL_CONTENT,
                headers: headers.build(),
                body: StaticBody::File {
                    file,
                    remaining: range.len(),
                },
            })
        }

        RangeRequest::Full if size <= SMALL_FILE_THRESHOLD => {
            let mut buf = Vec::with_capacity(size as usize);
            (&mut file).take(size).read_to_end(&mut buf).await?;

            if let Some(encoding) = encoding {
                match encoding.compress(&buf) {
                    Ok(compressed) if compressed.len() < buf.len() => {
                        headers.content_encoding(encoding.as_str());
                        headers.content_length(compressed.len() as u64);
                        return Ok(StaticResponse {
                            status: StatusCode::OK,
                            headers: headers.build(),
                            body: StaticBody::Bytes(Bytes::from(compressed)),
                        });
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "compression failed");
                    }
                }
            }

            headers.content_length(buf.len() as u64);
            Ok(StaticResponse {
                status: StatusCode::OK,
                headers: headers.build(),
                body: StaticBody::Bytes(Bytes::from(buf)),
            })
        }

        RangeRequest::Full => {
            headers.content_length(size);
            Ok(StaticResponse {
                status: StatusCode::OK,
                headers: headers.build(),
                body: StaticBody::File {
                    file,
                    remaining: size,
                },
            })
        }
    }
}
