use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::handlers::http::routes::{Router, build_api_router};
use crate::tower_middle::{AppService, TimeoutLayer};

/// A bound listener plus everything needed to serve it.
pub struct Application {
    listener: TcpListener,
    router: Arc<Router>,
    state: AppState,
    // address is exposed as a public field,
    // so we have access to it in tests.
    pub address: String,
}

impl Application {
    /// Bind `addr` (port 0 picks a free port) and prepare the API router.
    pub async fn build(state: AppState, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        let local = listener.local_addr().context("Listener has no local address")?;

        Ok(Self {
            listener,
            router: Arc::new(build_api_router()),
            state,
            address: format!("http://{}", local),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Listener has no local address")
    }

    /// Accept connections forever, serving each on its own task.
    pub async fn run(self) -> Result<()> {
        info!("Listening on {}", self.address);

        let timeout = Duration::from_secs(self.state.config.server.request_timeout_secs);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(err) => {
                    warn!("Failed to accept connection: {}", err);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let service = ServiceBuilder::new()
                .layer(TimeoutLayer::new(timeout))
                .service(AppService::new(
                    self.router.clone(),
                    self.state.clone(),
                    Some(peer),
                ));

            tokio::task::spawn(async move {
                if let Err(err) = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(io, TowerToHyperService::new(service))
                    .await
                {
                    debug!("Error serving connection from {}: {:?}", peer, err);
                }
            });
        }
    }
}
