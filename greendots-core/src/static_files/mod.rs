//! File responses shared by the raw API routes (`plan`, `status_stream`) and
//! the frontend.

mod compression;
mod etag;
mod file;
mod headers;
mod range;
mod resolve;
mod response;
#[cfg(test)]
mod tests;

pub use file::render_file;
pub use resolve::resolve_static_path;
pub use response::{
    CachePolicy, ConditionalHeaders, ServeError, ServeOptions, StaticBody, StaticResponse,
};

/// Cache-Control for every API response.
pub const NO_CACHE: &str = "no-cache, no-store, no-transform, must-revalidate, private, max-age=0";
