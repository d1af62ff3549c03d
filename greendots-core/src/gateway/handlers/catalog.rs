use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};
use http::StatusCode;

pub(super) async fn projects(state: &DashboardState, ex: &mut Exchange<'_>) -> Result<(), RequestError> {
    let list = state.catalog.projects().await?;
    ex.send_json(StatusCode::OK, &list).await
}

pub(super) async fn runs(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    project: &str,
) -> Result<(), RequestError> {
    let list = state.catalog.runs(project).await?;
    ex.send_json(StatusCode::OK, &list).await
}
