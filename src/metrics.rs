use crate::config::MetricsConfig;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{error, info};

pub struct Metrics {
    handle: PrometheusHandle,
}

impl Metrics {
    /// Installs the process-wide Prometheus recorder.
    pub fn new() -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        Ok(Self { handle })
    }

    pub fn from_handle(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }
}

pub fn request_completed(status: StatusCode, duration: Duration) {
    counter!("ipinfo_requests_total", 1,
            "status" => status.as_u16().to_string());
    histogram!("ipinfo_request_duration_us", duration.as_micros() as f64);
}

pub fn request_failed(error_type: &str) {
    counter!("ipinfo_request_errors_total", 1,
            "error_type" => error_type.to_string());
}

pub fn lookup(class: &str, is_private: bool) {
    counter!("ipinfo_lookups_total", 1,
            "class" => class.to_string(),
            "private" => is_private.to_string());
}

/// Installs the recorder and starts the exporter listener when enabled.
/// Returns the address it listens on.
pub async fn init(config: &MetricsConfig) -> anyhow::Result<Option<SocketAddr>> {
    if !config.enabled {
        info!("Metrics disabled");
        return Ok(None);
    }

    let metrics = Arc::new(Metrics::new()?);
    let addr: SocketAddr = config.bind.parse()?;
    let builder = Server::try_bind(&addr)?;
    let path = config.path.clone();

    info!("Starting metrics server on {} with path {}", addr, path);

    let make_svc = make_service_fn(move |_conn| {
        let metrics = Arc::clone(&metrics);
        let path = path.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let response = metrics_response(&req, &path, &metrics);
                async move { Ok::<_, Infallible>(response) }
            }))
        }
    });

    task::spawn(async move {
        if let Err(e) = builder.serve(make_svc).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(Some(addr))
}

fn metrics_response(req: &Request<Body>, path: &str, metrics: &Metrics) -> Response<Body> {
    if req.method() == Method::GET && req.uri().path() == path {
        let mut response = Response::new(Body::from(metrics.render()));
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        );
        response
    } else {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NOT_FOUND;
        response
    }
}
