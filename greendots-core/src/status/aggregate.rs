use crate::layout::{LayoutError, RunDir};
use crate::status::StatusError;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Latest record per test id. Iteration order carries no meaning.
pub type StatusMap = HashMap<String, Map<String, Value>>;

#[derive(Debug, Default)]
pub struct StatusSummary {
    pub records: StatusMap,
    /// Per shard, the byte offset just past the last record that was consumed.
    pub end_offsets: Vec<u64>,
}

impl StatusSummary {
    /// One JSON object per line.
    pub fn to_json_lines(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        for record in self.records.values() {
            serde_json::to_writer(&mut out, record)?;
            out.push(b'\n');
        }
        Ok(out)
    }
}

/// Fold every shard of a run into one record per test.
///
/// All shards named by the plan must exist. Each shard is read up to its first
/// blank, unparsable, or unterminated line; that is where a worker is still
/// writing, not an error.
pub async fn aggregate_statuses(run: &RunDir) -> Result<StatusSummary, StatusError> {
    let plan = run.load_plan().await?;

    let mut summary = StatusSummary {
        records: StatusMap::new(),
        end_offsets: Vec::with_capacity(plan.worker_count),
    };

    for shard in 0..plan.worker_count {
        let path = run.shard_path(shard);
        let file = File::open(&path)
            .await
            .map_err(|e| LayoutError::io(&path, e))?;

        let end = fold_shard(shard, BufReader::new(file), &mut summary.records)
            .await
            .map_err(|source| StatusError::ReadShard { path, source })?;

        summary.end_offsets.push(end);
    }

    tracing::debug!(
        run = %run.path().display(),
        shards = plan.worker_count,
        tests = summary.records.len(),
        "status summary aggregated"
    );

    Ok(summary)
}

async fn fold_shard<R>(shard: usize, mut reader: R, records: &mut StatusMap) -> std::io::Result<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut offset = 0u64;
    let mut line = Vec::new();

    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).await?;

        // EOF, or a record whose newline has not landed yet.
        if read == 0 || line.last() != Some(&b'\n') {
            break;
        }

        let body = trim_line_end(&line);
        if body.is_empty() {
            break;
        }

        let Ok(record) = serde_json::from_slice::<Map<String, Value>>(body) else {
            break;
        };

        if !merge_record(records, record) {
            tracing::warn!(shard, offset, "status record without a string `test` field skipped");
        }

        offset += read as u64;
    }

    Ok(offset)
}

/// Store `record` as the latest status of its test.
///
/// An earlier non-null `exception` survives a later record whose `exception`
/// is null or absent, so a heartbeat after a failure cannot hide the failure.
/// Returns `false` (and stores nothing) when the record has no string `test`.
pub fn merge_record(records: &mut StatusMap, mut record: Map<String, Value>) -> bool {
    let Some(Value::String(test)) = record.get("test") else {
        return false;
    };
    let test = test.clone();

    if let Some(prev) = records.get(&test) {
        let prev_exception = prev.get("exception").filter(|v| !v.is_null());
        let new_is_null = record.get("exception").is_none_or(Value::is_null);

        if let (Some(exception), true) = (prev_exception, new_is_null) {
            record.insert("exception".to_string(), exception.clone());
        }
    }

    records.insert(test, record);
    true
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
