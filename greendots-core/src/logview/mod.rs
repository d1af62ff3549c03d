//! HTML log views: the open-ended follower and the bounded tail.

mod follow;
mod markup;
mod tail;

pub use follow::{FollowEnd, FollowSettings, follow_log};
pub use markup::{START_MARKER, TRUNCATION_NOTICE, escape_lt};
pub use tail::{TailReader, render_tail};

use crate::layout::LayoutError;
use std::path::Path;
use tokio::fs::File;

/// Open a per-test log. A missing log is a not-found for the request.
pub async fn open_log(path: &Path) -> Result<File, LayoutError> {
    File::open(path).await.map_err(|e| LayoutError::io(path, e))
}
