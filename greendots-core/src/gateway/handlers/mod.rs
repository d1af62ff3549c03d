mod catalog;
mod frontend;
mod logs;
mod meta;
mod status;

use crate::gateway::endpoint::{Endpoint, query_param};
use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};

pub(crate) async fn dispatch(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    endpoint: Endpoint,
    query: Option<&str>,
) -> Result<(), RequestError> {
    match endpoint {
        Endpoint::Config => meta::config(state, ex).await,
        Endpoint::Version => meta::version(ex).await,
        Endpoint::ApiDocs => meta::docs(ex).await,

        Endpoint::Projects => catalog::projects(state, ex).await,
        Endpoint::Runs { project } => catalog::runs(state, ex, &project).await,

        Endpoint::Plan { project, run } => status::plan(state, ex, &project, &run).await,
        Endpoint::StatusSummary { project, run } => {
            status::summary(state, ex, &project, &run).await
        }
        Endpoint::StatusPoll { project, run } => status::poll(state, ex, &project, &run).await,
        Endpoint::StatusStream {
            project,
            run,
            worker,
        } => status::stream(state, ex, &project, &run, &worker).await,

        Endpoint::LogStream { project, run, test } => {
            let truncate = query_param(query, "notrunc").is_none();
            logs::stream(state, ex, &project, &run, &test, truncate).await
        }
        Endpoint::LogTail { project, run, test } => {
            let lines = query_param(query, "lines");
            logs::tail(state, ex, &project, &run, &test, lines.as_deref()).await
        }

        Endpoint::Asset { path } => frontend::asset(state, ex, &path).await,
        Endpoint::Favicon => frontend::file(state, ex, "favicon.ico").await,
        Endpoint::Frontend => frontend::file(state, ex, "index.html").await,
    }
}
