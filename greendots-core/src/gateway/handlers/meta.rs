use crate::assets;
use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};
use crate::version::full_version;
use bytes::Bytes;
use http::StatusCode;

const TEXT: &str = "text/plain; charset=utf-8";

pub(super) async fn config(state: &DashboardState, ex: &mut Exchange<'_>) -> Result<(), RequestError> {
    ex.send_json(StatusCode::OK, state.config.as_ref()).await
}

pub(super) async fn version(ex: &mut Exchange<'_>) -> Result<(), RequestError> {
    ex.send(StatusCode::OK, TEXT, Bytes::from(full_version()))
        .await
}

pub(super) async fn docs(ex: &mut Exchange<'_>) -> Result<(), RequestError> {
    ex.send(StatusCode::OK, TEXT, assets::api_docs()).await
}
