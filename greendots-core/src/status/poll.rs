use crate::conf::StatusPollConfig;
use crate::layout::{LayoutError, RunDir};
use crate::status::StatusError;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep, sleep_until};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Indices of the shards that are now larger than the client last saw.
    Changed(Vec<usize>),
    TimedOut,
    /// The client went away first. Nothing should be written back.
    Disconnected,
}

/// Body of a successful poll.
#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub workers_to_check: Vec<usize>,
}

/// Long-poll over shard sizes.
///
/// Shards only ever grow, so comparing sizes is enough to detect new records.
#[derive(Debug, Clone, Copy)]
pub struct StatusPoller {
    sleep: Duration,
    timeout: Duration,
}

impl StatusPoller {
    pub fn new(cfg: &StatusPollConfig) -> Self {
        Self::with_intervals(cfg.sleep(), cfg.timeout())
    }

    pub fn with_intervals(sleep: Duration, timeout: Duration) -> Self {
        Self { sleep, timeout }
    }

    /// One pass over the shards. `expected[i]` is the size the client holds for
    /// shard `i`; every listed shard must exist.
    pub async fn grown_shards(run: &RunDir, expected: &[u64]) -> Result<Vec<usize>, StatusError> {
        let mut grown = Vec::new();

        for (index, &seen) in expected.iter().enumerate() {
            let path = run.shard_path(index);
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| LayoutError::io(&path, e))?;

            if meta.len() > seen {
                grown.push(index);
            }
        }

        Ok(grown)
    }

    /// Wait until some shard grows, the timeout passes, or `disconnected`
    /// resolves, whichever comes first. A client that is gone is noticed even
    /// while the poller is sleeping.
    pub async fn wait<F>(
        &self,
        run: &RunDir,
        expected: &[u64],
        disconnected: F,
    ) -> Result<PollOutcome, StatusError>
    where
        F: Future<Output = ()>,
    {
        if expected.is_empty() {
            return Err(StatusError::EmptyPoll);
        }

        let deadline = Instant::now() + self.timeout;
        tokio::pin!(disconnected);

        loop {
            let grown = Self::grown_shards(run, expected).await?;
            if !grown.is_empty() {
                tracing::debug!(shards = ?grown, "status shards grew");
                return Ok(PollOutcome::Changed(grown));
            }

            tokio::select! {
                biased;

                _ = &mut disconnected => {
                    tracing::debug!(run = %run.path().display(), "poll client disconnected");
                    return Ok(PollOutcome::Disconnected);
                }
                _ = sleep_until(deadline) => return Ok(PollOutcome::TimedOut),
                _ = sleep(self.sleep) => {}
            }
        }
    }
}
