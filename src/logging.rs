use hyper::StatusCode;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::{fmt::time::ChronoUtc, prelude::*, EnvFilter};

/// Per-request structured logging, keyed by a fresh request id.
pub struct RequestLogger {
    start_time: Instant,
    request_id: String,
    client_ip: String,
    method: String,
    path: String,
}

impl RequestLogger {
    pub fn new(client_addr: Option<SocketAddr>, method: &str, path: &str) -> Self {
        Self {
            start_time: Instant::now(),
            request_id: uuid::Uuid::new_v4().to_string(),
            client_ip: client_addr
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "-".to_string()),
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn log_request_start(&self) {
        tracing::debug!(
            request_id = %self.request_id,
            client_ip = %self.client_ip,
            method = %self.method,
            path = %self.path,
            event = "request_start",
            "Request started"
        );
    }

    pub fn log_lookup(&self, ip: &str, class: &str, is_private: bool) {
        tracing::debug!(
            request_id = %self.request_id,
            ip = %ip,
            class = %class,
            is_private = is_private,
            event = "lookup",
            "Address analyzed"
        );
    }

    pub fn log_request_end(&self, status: StatusCode) {
        let duration = self.elapsed();
        tracing::info!(
            request_id = %self.request_id,
            client_ip = %self.client_ip,
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            duration_us = duration.as_micros() as u64,
            event = "request_end",
            "Request completed"
        );
    }

    pub fn log_error(&self, status: StatusCode, error: &str) {
        let duration = self.elapsed();
        tracing::warn!(
            request_id = %self.request_id,
            client_ip = %self.client_ip,
            method = %self.method,
            path = %self.path,
            status = status.as_u16(),
            error = %error,
            duration_us = duration.as_micros() as u64,
            event = "request_error",
            "Request rejected"
        );
    }
}

pub fn init(level: Level, json_logs: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ipinfo={}", level)));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_ansi(true),
            )
            .try_init()?;
    }

    Ok(())
}

pub fn log_startup_info(version: &str, bind_address: SocketAddr, metrics_address: Option<SocketAddr>) {
    tracing::info!(
        version = %version,
        bind_address = %bind_address,
        metrics_address = ?metrics_address,
        event = "startup",
        "ipinfo started successfully"
    );
}

pub fn log_shutdown_signal(signal: &str) {
    tracing::info!(
        signal = %signal,
        event = "shutdown_signal",
        "Received shutdown signal"
    );
}
