use crate::gateway::respond::Exchange;
use crate::gateway::{DashboardState, RequestError};
use crate::static_files::{
    CachePolicy, ConditionalHeaders, ServeOptions, render_file, resolve_static_path,
};
use std::path::Path;

/// Hashed build output under `frontend_dir/assets`.
pub(super) async fn asset(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    encoded: &str,
) -> Result<(), RequestError> {
    let dir = frontend_dir(state)?;
    let path = resolve_static_path(&dir.join("assets"), encoded)?;
    serve(ex, &path, CachePolicy::Immutable).await
}

/// A fixed file at the top of `frontend_dir`.
pub(super) async fn file(
    state: &DashboardState,
    ex: &mut Exchange<'_>,
    name: &str,
) -> Result<(), RequestError> {
    let dir = frontend_dir(state)?;
    serve(ex, &dir.join(name), CachePolicy::NoStore).await
}

fn frontend_dir(state: &DashboardState) -> Result<&Path, RequestError> {
    state
        .config
        .frontend_dir
        .as_deref()
        .ok_or(RequestError::NotFound)
}

async fn serve(ex: &mut Exchange<'_>, path: &Path, cache: CachePolicy) -> Result<(), RequestError> {
    let conditional = ConditionalHeaders::from_headers(&ex.session().req_header().headers);
    let resp = render_file(path, &conditional, &ServeOptions::frontend(cache)).await?;
    ex.send_static(resp).await
}
