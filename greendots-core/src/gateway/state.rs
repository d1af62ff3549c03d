use crate::catalog::Catalog;
use crate::conf::DashboardConfig;
use crate::format::LevelTable;
use crate::layout::ProjectsRoot;
use crate::logview::FollowSettings;
use crate::status::StatusPoller;
use std::sync::Arc;

/// Everything a handler needs, built once from the configuration.
#[derive(Debug)]
pub struct DashboardState {
    pub(crate) config: Arc<DashboardConfig>,
    pub(crate) root: ProjectsRoot,
    pub(crate) catalog: Catalog,
    pub(crate) levels: LevelTable,
    pub(crate) poller: StatusPoller,
}

impl DashboardState {
    pub fn new(config: Arc<DashboardConfig>) -> Self {
        let root = ProjectsRoot::new(&config.projects_dir);

        Self {
            catalog: Catalog::new(root.clone()),
            levels: LevelTable::from_config(&config),
            poller: StatusPoller::new(&config.status_poll),
            root,
            config,
        }
    }

    pub(crate) fn follow_settings(&self, truncate: bool) -> FollowSettings {
        let stream = &self.config.status_stream;
        FollowSettings {
            chunk_size: stream.chunk_size,
            eof_sleep: stream.eof_sleep(),
            truncate_after: truncate.then_some(stream.log_truncation_size),
        }
    }
}
