//! Where a run's files live on shared storage.
//!
//! ```text
//! {root}/{project}/metadata.toml
//! {root}/{project}/{run}/metadata.toml
//! {root}/{project}/{run}/plan.json
//! {root}/{project}/{run}/status.{worker}.jsonl
//! {root}/{project}/{run}/{test with '/' -> '_'}.log.jsonl
//! ```
//!
//! Request path components are joined directly under the root, so every one of
//! them goes through [`guard_component`] first.

mod error;
mod plan;

pub use error::LayoutError;
pub use plan::{RunPlan, TestItem};

use std::path::{Path, PathBuf};

pub const PLAN_FILE: &str = "plan.json";
pub const METADATA_FILE: &str = "metadata.toml";

/// Reject a path component that could step outside its parent directory.
///
/// Anything starting with `.` (which covers `.` and `..`) is refused, as is
/// anything that would split into several components once joined.
pub fn guard_component(component: &str) -> Result<&str, LayoutError> {
    let splits = component.contains(['/', '\\', '\0']);
    if component.is_empty() || component.starts_with('.') || splits {
        return Err(LayoutError::Traversal {
            component: component.to_string(),
        });
    }
    Ok(component)
}

/// File stem a test's log is written under.
pub fn log_file_stem(test: &str) -> String {
    test.replace('/', "_")
}

#[derive(Debug, Clone)]
pub struct ProjectsRoot {
    dir: PathBuf,
}

impl ProjectsRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn project(&self, project: &str) -> Result<PathBuf, LayoutError> {
        Ok(self.dir.join(guard_component(project)?))
    }

    pub fn run(&self, project: &str, run: &str) -> Result<RunDir, LayoutError> {
        let dir = self.project(project)?.join(guard_component(run)?);
        Ok(RunDir { dir })
    }
}

/// One run's directory. Construction is the only place components are guarded.
#[derive(Debug, Clone)]
pub struct RunDir {
    dir: PathBuf,
}

impl RunDir {
    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn plan_path(&self) -> PathBuf {
        self.dir.join(PLAN_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.dir.join(METADATA_FILE)
    }

    /// Status shard written by worker `index`.
    pub fn shard_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("status.{index}.jsonl"))
    }

    /// Status shard addressed by a raw worker id taken from a request path.
    pub fn worker_shard_path(&self, worker_id: &str) -> Result<PathBuf, LayoutError> {
        let worker_id = guard_component(worker_id)?;
        Ok(self.dir.join(format!("status.{worker_id}.jsonl")))
    }

    pub fn log_path(&self, test: &str) -> Result<PathBuf, LayoutError> {
        let stem = log_file_stem(test);
        let stem = guard_component(&stem)?;
        Ok(self.dir.join(format!("{stem}.log.jsonl")))
    }

    /// Read and decode the run plan.
    pub async fn load_plan(&self) -> Result<RunPlan, LayoutError> {
        let path = self.plan_path();
        let raw = tokio::fs::read(&path)
            .await
            .map_err(|e| LayoutError::io(&path, e))?;

        serde_json::from_slice(&raw).map_err(|source| LayoutError::MalformedPlan { path, source })
    }
}
