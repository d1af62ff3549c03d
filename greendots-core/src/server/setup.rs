use crate::conf::DashboardConfig;
use crate::gateway::{DashboardGateway, DashboardState};
use anyhow::{Context, Error, Result};
use pingora::prelude::*;
use pingora::server::Server;
use pingora::server::configuration::ServerConf;
use std::sync::Arc;

/// Run the dashboard with the given configuration. Never returns on success.
pub fn run(config: DashboardConfig) -> Result<()> {
    let config = Arc::new(config);

    tracing::info!(
        listen = %config.listen_addr(),
        projects_dir = %config.projects_dir.display(),
        "starting dashboard"
    );

    let server = build_pingora_server(config)?;

    // Pingora owns its runtimes; run_forever blocks the main thread.
    server.run_forever();
}

/// Build the Pingora server with the dashboard gateway bound to the listen address.
pub fn build_pingora_server(config: Arc<DashboardConfig>) -> Result<Server, Error> {
    let mut server = if let Some(threads) = config.threads {
        tracing::debug!(
            threads,
            "Creating Pingora server with overridden worker threads"
        );
        let mut conf =
            ServerConf::new().context("could not construct pingora server configuration")?;
        conf.threads = threads;
        Server::new_with_opt_and_conf(None, conf)
    } else {
        // "None" is required here to truly tell Pingora to use its default settings.
        Server::new(None)?
    };

    server.bootstrap();

    let state = DashboardState::new(config.clone());
    let gateway = DashboardGateway::new(Arc::new(state));

    let mut svc = http_proxy_service(&server.configuration, gateway);
    svc.add_tcp(&config.listen_addr());

    server.add_service(svc);

    Ok(server)
}
