use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

/// Bodies smaller than this are never worth encoding.
pub(crate) const MIN_COMPRESS_SIZE: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Brotli,
    Gzip,
}

impl Encoding {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Brotli => "br",
            Self::Gzip => "gzip",
        }
    }

    /// Brotli wins ties; `q=0` rules an encoding out.
    pub(crate) fn negotiate(accept_encoding: &str) -> Option<Self> {
        let br = quality_of(accept_encoding, "br");
        let gzip = quality_of(accept_encoding, "gzip");

        match (br, gzip) {
            (Some(br), Some(gzip)) if gzip > br => Some(Self::Gzip),
            (Some(_), _) => Some(Self::Brotli),
            (None, Some(_)) => Some(Self::Gzip),
            (None, None) => None,
        }
    }

    pub(crate) fn compress(self, data: &[u8]) -> std::io::Result<Vec<u8>> {
        match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Brotli => {
                let mut output = Vec::new();
                let params = brotli::enc::BrotliEncoderParams {
                    quality: 4,
                    lgwin: 22,
                    ..Default::default()
                };
                brotli::enc::BrotliCompress(&mut std::io::Cursor::new(data), &mut output, &params)?;
                Ok(output)
            }
        }
    }
}

/// Text-like types that shrink well.
pub(crate) fn is_compressible_mime(mime: &mime_guess::Mime) -> bool {
    match (mime.type_().as_str(), mime.subtype().as_str()) {
        ("text", _) => true,
        ("image", "svg+xml") => true,
        ("application", sub) => matches!(
            sub,
            "json" | "javascript" | "x-javascript" | "xml" | "xhtml+xml" | "svg+xml" | "wasm"
        ),
        _ => false,
    }
}

fn quality_of(accept_encoding: &str, name: &str) -> Option<f32> {
    for part in accept_encoding.split(',') {
        let mut pieces = part.split(';');
        let coding = pieces.next().unwrap_or("").trim();
        if !coding.eq_ignore_ascii_case(name) && coding != "*" {
            continue;
        }

        let q = pieces
            .find_map(|p| p.trim().strip_prefix("q="))
            .and_then(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);
        return (q > 0.0).then_some(q);
    }
    None
}
