//! Worker status shards: the cross-worker aggregate and the long-poll that
//! tells a client which shards have grown.

mod aggregate;
mod error;
mod poll;
#[cfg(test)]
mod tests;

pub use aggregate::{StatusMap, StatusSummary, aggregate_statuses, merge_record};
pub use error::StatusError;
pub use poll::{PollOutcome, PollResponse, StatusPoller};
