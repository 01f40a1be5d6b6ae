//! HTTP behaviour of the lookup endpoint, both through the handler and over a
//! real listener.

use hyper::body::to_bytes;
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Response, StatusCode};
use ipinfo::api::{handle_request, IpInfo};
use ipinfo::config::ServerConfig;
use ipinfo::server::ApiServer;
use ipinfo::AddressClass;
use tokio::sync::oneshot;

async fn call(method: Method, uri: &str) -> Response<Body> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    handle_request(req, None).await.unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_lookup_ok() {
    let response = call(Method::GET, "/api/ipinfo?ip=192.168.1.10").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let bytes = to_bytes(response.into_body()).await.unwrap();
    let info: IpInfo = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        info,
        IpInfo {
            ip: "192.168.1.10".to_string(),
            subnet: "192.168.1.0/24".to_string(),
            gateway: "192.168.1.1".to_string(),
            class: AddressClass::C,
            is_private: true,
        }
    );
}

#[tokio::test]
async fn test_lookup_ipv6() {
    let response = call(Method::GET, "/api/ipinfo?ip=2001%3Adb8%3A%3A1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["ip"], "2001:db8::1");
    assert_eq!(value["class"], "IPv6");
    assert_eq!(value["subnet"], "2001:db8::/64");
    assert_eq!(value["gateway"], "N/A for IPv6");
    assert_eq!(value["is_private"], false);
}

#[tokio::test]
async fn test_invalid_ip_is_plain_text_400() {
    let response = call(Method::GET, "/api/ipinfo?ip=not-an-ip").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let body = body_text(response).await;
    assert_eq!(body.trim_end(), "Invalid IP address");
    assert!(serde_json::from_str::<serde_json::Value>(&body).is_err());
}

#[tokio::test]
async fn test_missing_ip_is_400() {
    let response = call(Method::GET, "/api/ipinfo").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await.trim_end(), "IP address is required");

    let response = call(Method::GET, "/api/ipinfo?ip=&other=1").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_get_is_405() {
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD, Method::OPTIONS] {
        let response = call(method.clone(), "/api/ipinfo?ip=10.0.0.5").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_text(response).await.trim_end(), "Method not allowed");
    }
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = call(Method::GET, "/api/ipinfo/extra?ip=10.0.0.5").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = call(Method::GET, "/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_served_over_tcp() {
    let config = ServerConfig {
        bind: "127.0.0.1:0".to_string(),
    };
    let server = ApiServer::bind(&config).unwrap();
    let addr = server.local_addr();

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.run(async move {
        shutdown_rx.await.ok();
    }));

    let client = Client::new();
    let uri = format!("http://{}/api/ipinfo?ip=172.16.5.1", addr).parse().unwrap();
    let response = client.get(uri).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["class"], "B");
    assert_eq!(value["is_private"], true);

    let req = Request::post(format!("http://{}/api/ipinfo?ip=172.16.5.1", addr))
        .body(Body::empty())
        .unwrap();
    let response = client.request(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

    drop(client);
    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
