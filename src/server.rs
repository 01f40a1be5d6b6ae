use crate::api;
use crate::config::ServerConfig;
use anyhow::Result;
use hyper::server::conn::{AddrIncoming, AddrStream};
use hyper::service::make_service_fn;
use hyper::Server;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

/// HTTP listener for the lookup API.
pub struct ApiServer {
    incoming: AddrIncoming,
}

impl ApiServer {
    /// Binds the listener without accepting connections yet.
    pub fn bind(config: &ServerConfig) -> Result<Self> {
        let addr = config.bind_addr()?;
        let incoming = AddrIncoming::bind(&addr)?;
        info!("API listening on {}", incoming.local_addr());
        Ok(Self { incoming })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.incoming.local_addr()
    }

    /// Serves until `shutdown` resolves, then drains open connections.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let make_svc = make_service_fn(|conn: &AddrStream| {
            let client_addr = conn.remote_addr();
            let service = ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .service_fn(move |req| api::handle_request(req, Some(client_addr)));
            async move { Ok::<_, Infallible>(service) }
        });

        Server::builder(self.incoming)
            .serve(make_svc)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("API server stopped");
        Ok(())
    }
}
