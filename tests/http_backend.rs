//! HttpBackend against an in-process fake daemon.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use ccentral_tui::refresh::snapshot;
use ccentral_tui::{ApiError, Backend, HttpBackend};

/// (method, path, body) of every request the fake daemon received.
type RequestLog = Arc<Mutex<Vec<(Method, String, String)>>>;

const BILLING: &str = r#"{
    "info": {"owner": "payments"},
    "schema": {
        "timeout": {"title": "Timeout", "type": "integer", "description": "Seconds", "default": "30"}
    },
    "config": {
        "timeout": {"value": "45", "changed": 1700000000},
        "v": {"value": "3", "changed": 1700000000}
    },
    "clients": {
        "billing-1": {"v": "3", "ts": 9999999999, "c_hits": [1, 2, "5"], "k_host": "web-1"},
        "billing-2": {"v": 2, "ts": 9999999999, "c_hits": ["4"]}
    }
}"#;

fn reply(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap()
}

async fn handle_request(
    req: Request<hyper::body::Incoming>,
    log: RequestLog,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let body = req.into_body().collect().await.map(|b| b.to_bytes()).unwrap_or_default();
    log.lock()
        .unwrap()
        .push((method.clone(), path.clone(), String::from_utf8_lossy(&body).into_owned()));

    let response = match (method, path.as_str()) {
        (Method::GET, "/check") => reply(StatusCode::OK, "OK"),
        (Method::GET, "/api/1/services") => {
            reply(StatusCode::OK, r#"{"services": ["billing", "a/b"]}"#)
        }
        (Method::GET, "/api/1/services/billing") => reply(StatusCode::OK, BILLING),
        (Method::GET, "/api/1/services/a%2Fb") => reply(StatusCode::OK, "{}"),
        (Method::GET, "/api/1/services/a%5Cb") => reply(StatusCode::OK, "{}"),
        (Method::GET, "/api/1/services/broken") => reply(StatusCode::OK, "not json"),
        (Method::GET, "/api/1/services/crash") => {
            reply(StatusCode::INTERNAL_SERVER_ERROR, "boom\n")
        }
        (Method::GET, "/api/1/services/slow") => {
            tokio::time::sleep(Duration::from_secs(2)).await;
            reply(StatusCode::OK, "{}")
        }
        (Method::PUT, p) if p.starts_with("/api/1/services/billing/keys/") => {
            reply(StatusCode::OK, "{}")
        }
        _ => reply(StatusCode::NOT_FOUND, r#"{"error": "Service not found"}"#),
    };
    Ok(response)
}

/// Start the fake daemon on an ephemeral port.
async fn spawn_daemon() -> (SocketAddr, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log: RequestLog = Arc::default();
    let server_log = log.clone();

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                break;
            };
            let io = TokioIo::new(stream);
            let log = server_log.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| handle_request(req, log.clone()));
                let _ = http1::Builder::new().serve_connection(io, service).await;
            });
        }
    });

    (addr, log)
}

fn backend(addr: SocketAddr) -> HttpBackend {
    HttpBackend::builder()
        .endpoint(format!("http://{}/", addr))
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_list_services() {
    let (addr, _) = spawn_daemon().await;
    let services = backend(addr).list_services().await.unwrap();
    assert_eq!(services, vec!["billing".to_string(), "a/b".to_string()]);
}

#[tokio::test]
async fn test_fetch_service() {
    let (addr, _) = spawn_daemon().await;
    let descriptor = backend(addr).fetch_service("billing").await.unwrap();

    assert_eq!(descriptor.info["owner"], "payments");
    assert_eq!(descriptor.schema["timeout"].default.as_deref(), Some("30"));
    assert_eq!(descriptor.config["timeout"].value, "45");
    assert_eq!(descriptor.config["timeout"].changed, 1_700_000_000);
    assert_eq!(descriptor.clients.len(), 2);
}

#[tokio::test]
async fn test_service_name_is_encoded() {
    let (addr, log) = spawn_daemon().await;
    let descriptor = backend(addr).fetch_service("a/b").await.unwrap();
    assert!(descriptor.clients.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log[0].1, "/api/1/services/a%2Fb");
}

#[tokio::test]
async fn test_backslash_name_is_encoded() {
    let (addr, log) = spawn_daemon().await;
    let descriptor = backend(addr).fetch_service("a\\b").await.unwrap();
    assert!(descriptor.clients.is_empty());

    let log = log.lock().unwrap();
    assert_eq!(log[0].1, "/api/1/services/a%5Cb");
}

#[tokio::test]
async fn test_save_key_sends_raw_body() {
    let (addr, log) = spawn_daemon().await;
    backend(addr).save_key("billing", "timeout", "60 seconds").await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    let (method, path, body) = &log[0];
    assert_eq!(*method, Method::PUT);
    assert_eq!(path, "/api/1/services/billing/keys/timeout");
    assert_eq!(body, "60 seconds");
}

#[tokio::test]
async fn test_check() {
    let (addr, log) = spawn_daemon().await;
    backend(addr).check().await.unwrap();
    assert_eq!(log.lock().unwrap()[0].1, "/check");
}

#[tokio::test]
async fn test_error_body_message() {
    let (addr, _) = spawn_daemon().await;
    let err = backend(addr).fetch_service("missing").await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Service not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_plain_error_body() {
    let (addr, _) = spawn_daemon().await;
    let err = backend(addr).fetch_service("crash").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status: 500, ref message } if message == "boom"
    ));
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let (addr, _) = spawn_daemon().await;
    let err = backend(addr).fetch_service("broken").await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_timeout() {
    let (addr, _) = spawn_daemon().await;
    let err = backend(addr).fetch_service("slow").await.unwrap_err();
    assert!(matches!(err, ApiError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(addr).list_services().await.unwrap_err();
    assert!(matches!(err, ApiError::Connection(_)), "got {err:?}");
}

#[tokio::test]
async fn test_snapshot_over_http() {
    let (addr, _) = spawn_daemon().await;
    let view = snapshot(&backend(addr), "billing").await.unwrap();

    let data = view.service_data.as_ref().unwrap();
    assert_eq!(data.get("timeout").unwrap().value.as_deref(), Some("45"));
    assert_eq!(data.version(), Some("3"));

    // billing-2 reports a numeric version 2 against service version 3
    assert_eq!(view.tags_for("billing-1")[0].text, "Ok");
    assert_eq!(view.tags_for("billing-2")[0].text, "Old version ( v.2 )");
    assert_eq!(view.totals.get("hits 1/min"), Some(9));
    assert_eq!(view.headers.get("k_host").map(String::as_str), Some("host"));
}
