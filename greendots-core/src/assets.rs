use bytes::Bytes;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Embedded;

fn load(name: &str) -> Bytes {
    match Embedded::get(name) {
        Some(file) => Bytes::from(file.data.into_owned()),
        None => {
            tracing::error!(asset = name, "embedded asset missing");
            Bytes::new()
        }
    }
}

/// HTML wrapper sent before any formatted log line. Leaves a `<pre>` open.
pub fn logs_view_prefix() -> Bytes {
    load("logs_view.html")
}

/// Sent ahead of [`logs_view_prefix`] by the tail view so the page pins to the bottom.
pub fn tail_view_prefix() -> Bytes {
    load("tail_logs_view_prefix.html")
}

pub fn api_docs() -> Bytes {
    load("api-docs.txt")
}
