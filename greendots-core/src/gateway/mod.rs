//! The dashboard's HTTP surface as a terminal pingora gateway.

mod endpoint;
mod error;
mod handlers;
mod respond;
mod session_sink;
mod state;

pub use error::RequestError;
pub use state::DashboardState;

use crate::gateway::endpoint::Endpoint;
use crate::gateway::respond::Exchange;
use async_trait::async_trait;
use http::Method;
use pingora::prelude::{HttpPeer, ProxyHttp, Session};
use pingora::{Custom, Error};
use std::sync::Arc;

pub struct DashboardGateway {
    state: Arc<DashboardState>,
}

impl DashboardGateway {
    pub fn new(state: Arc<DashboardState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl ProxyHttp for DashboardGateway {
    type CTX = ();

    fn new_ctx(&self) -> Self::CTX {}

    async fn upstream_peer(
        &self,
        _session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> pingora::Result<Box<HttpPeer>> {
        // Every request is answered in request_filter.
        Err(Error::new(Custom("DashboardGateway has no upstream (bug)")))
    }

    async fn request_filter(
        &self,
        session: &mut Session,
        _ctx: &mut Self::CTX,
    ) -> pingora::Result<bool> {
        let req = session.req_header();
        let method = req.method.clone();
        let path = req.uri.path().to_owned();
        let query = req.uri.query().map(str::to_owned);

        tracing::debug!(%method, path = %path, "request");

        let endpoint = path.parse::<Endpoint>();
        let api = endpoint.as_ref().map_or(true, Endpoint::is_api);
        let mut ex = Exchange::new(session, method == Method::HEAD, api);

        let result = match endpoint {
            Ok(endpoint) if endpoint.accepts(&method) => {
                handlers::dispatch(&self.state, &mut ex, endpoint, query.as_deref()).await
            }
            Ok(endpoint) if endpoint.is_named_api() => {
                ex.send_method_not_allowed(&endpoint.method()).await
            }
            Ok(_) => Err(RequestError::NotFound),
            Err(err) => Err(err),
        };

        if let Err(err) = result {
            report(&mut ex, &method, &path, err).await;
        }

        Ok(true)
    }
}

/// Turn a failed request into an error response, or drop the connection if
/// the response had already begun.
async fn report(ex: &mut Exchange<'_>, method: &Method, path: &str, err: RequestError) {
    let status = err.status_code();

    if let RequestError::Transport(err) = &err {
        tracing::debug!(%method, path, error = %err, "client connection lost");
        ex.abandon();
        return;
    }

    if status.is_server_error() {
        tracing::warn!(%method, path, status = status.as_u16(), error = %err, "request failed");
    } else {
        tracing::debug!(%method, path, status = status.as_u16(), error = %err, "request rejected");
    }

    if ex.started() {
        ex.abandon();
        return;
    }

    if let Err(write_err) = ex.send_error(status).await {
        tracing::debug!(%method, path, error = %write_err, "failed to send error response");
        ex.abandon();
    }
}
