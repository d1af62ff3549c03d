//! Project and run listings.

mod age;
mod metadata;

pub use age::pretty_age;
pub use metadata::{load_metadata, toml_to_json};

use crate::layout::{LayoutError, METADATA_FILE, ProjectsRoot};
use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::SystemTime;

/// Runs listed per project on the overview.
pub const OVERVIEW_RUNS: usize = 10;

#[derive(Debug, Serialize)]
pub struct ProjectsList {
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Serialize)]
pub struct ProjectEntry {
    pub id: String,
    pub runs: Vec<RunEntry>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RunsList {
    pub runs: Vec<RunEntry>,
}

#[derive(Debug, Serialize)]
pub struct RunEntry {
    pub id: String,
    pub pretty_age: String,
    pub created_at: String,
    pub metadata: Option<Value>,
    #[serde(skip)]
    modified: SystemTime,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    root: ProjectsRoot,
}

impl Catalog {
    pub fn new(root: ProjectsRoot) -> Self {
        Self { root }
    }

    /// Every project with its newest runs. Projects that cannot be listed are
    /// left out rather than failing the whole overview.
    pub async fn projects(&self) -> Result<ProjectsList, LayoutError> {
        let mut projects = Vec::new();

        for id in subdirectories(self.root.path()).await? {
            let dir = self.root.path().join(&id);

            let mut runs = match list_runs(&dir).await {
                Ok(runs) => runs,
                Err(err) => {
                    tracing::warn!(project = %id, error = %err, "skipping unreadable project");
                    continue;
                }
            };
            runs.truncate(OVERVIEW_RUNS);
            attach_metadata(&dir, &mut runs).await;

            projects.push(ProjectEntry {
                metadata: load_metadata(&dir.join(METADATA_FILE)).await,
                id,
                runs,
            });
        }

        projects.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ProjectsList { projects })
    }

    /// All runs of one project, newest first.
    pub async fn runs(&self, project: &str) -> Result<RunsList, LayoutError> {
        let dir = self.root.project(project)?;

        let mut runs = list_runs(&dir).await?;
        attach_metadata(&dir, &mut runs).await;

        Ok(RunsList { runs })
    }
}

async fn list_runs(project_dir: &Path) -> Result<Vec<RunEntry>, LayoutError> {
    let now = SystemTime::now();
    let mut runs = Vec::new();

    for id in subdirectories(project_dir).await? {
        let Ok(meta) = tokio::fs::metadata(project_dir.join(&id)).await else {
            continue;
        };
        let Ok(modified) = meta.modified() else {
            continue;
        };

        let age = now.duration_since(modified).unwrap_or_default();
        runs.push(RunEntry {
            id,
            pretty_age: pretty_age(age),
            created_at: DateTime::<Local>::from(modified).to_rfc3339_opts(SecondsFormat::Secs, true),
            metadata: None,
            modified,
        });
    }

    runs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.id.cmp(&b.id)));
    Ok(runs)
}

async fn attach_metadata(project_dir: &Path, runs: &mut [RunEntry]) {
    for run in runs {
        run.metadata = load_metadata(&project_dir.join(&run.id).join(METADATA_FILE)).await;
    }
}

/// Names of the visible subdirectories of `dir`.
async fn subdirectories(dir: &Path) -> Result<Vec<String>, LayoutError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| LayoutError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LayoutError::io(dir, e))?
    {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        let is_dir = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if is_dir {
            names.push(name);
        }
    }

    Ok(names)
}
