//! `GET /api/ipinfo?ip=<address>`.

use crate::analyzer::{self, AddressClass, SubnetDescriptor};
use crate::error::ApiError;
use crate::logging::RequestLogger;
use crate::metrics;
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use hyper::{Body, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use tracing::error;

pub const IPINFO_PATH: &str = "/api/ipinfo";

const JSON: &str = "application/json";
const PLAIN_TEXT: &str = "text/plain; charset=utf-8";

/// Response body of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInfo {
    pub ip: String,
    pub subnet: String,
    pub gateway: String,
    pub class: AddressClass,
    pub is_private: bool,
}

impl From<&SubnetDescriptor> for IpInfo {
    fn from(descriptor: &SubnetDescriptor) -> Self {
        Self {
            ip: descriptor.address().to_string(),
            subnet: descriptor.subnet(),
            gateway: descriptor.gateway_text(),
            class: descriptor.class(),
            is_private: descriptor.is_private(),
        }
    }
}

pub async fn handle_request(
    req: Request<Body>,
    client_addr: Option<SocketAddr>,
) -> Result<Response<Body>, Infallible> {
    let logger = RequestLogger::new(client_addr, req.method().as_str(), req.uri().path());
    logger.log_request_start();

    let response = match lookup(&req) {
        Ok(info) => {
            logger.log_lookup(&info.ip, info.class.label(), info.is_private);
            metrics::lookup(info.class.label(), info.is_private);
            json_response(&info)
        }
        Err(err) => {
            logger.log_error(err.status(), &err.to_string());
            metrics::request_failed(err.kind());
            error_response(&err)
        }
    };

    logger.log_request_end(response.status());
    metrics::request_completed(response.status(), logger.elapsed());
    Ok(response)
}

fn lookup(req: &Request<Body>) -> Result<IpInfo, ApiError> {
    let path = req.uri().path();
    if path != IPINFO_PATH {
        return Err(ApiError::NotFound(path.to_string()));
    }

    if req.method() != Method::GET {
        return Err(ApiError::UnsupportedMethod(req.method().to_string()));
    }

    let ip = query_param(req.uri().query(), "ip")
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingAddress)?;

    let descriptor = analyzer::analyze(&ip)?;
    Ok(IpInfo::from(&descriptor))
}

/// First value of `name` in a form-urlencoded query string.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn json_response(info: &IpInfo) -> Response<Body> {
    match serde_json::to_vec(info) {
        Ok(mut body) => {
            body.push(b'\n');
            response(StatusCode::OK, JSON, Body::from(body))
        }
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            response(
                StatusCode::INTERNAL_SERVER_ERROR,
                PLAIN_TEXT,
                Body::from("Internal Server Error\n"),
            )
        }
    }
}

fn error_response(err: &ApiError) -> Response<Body> {
    let mut response = response(err.status(), PLAIN_TEXT, Body::from(format!("{}\n", err)));
    response
        .headers_mut()
        .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

fn response(status: StatusCode, content_type: &'static str, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}
