//! Integration tests for the courier crate.
//!
//! These run the default reqwest transport against a loopback server, so
//! they cover the real wire path: sized replayable bodies, header defaults,
//! retries and transport error classification.

use std::time::Duration;

use courier::http::HttpClientConfig;
use courier::{EngineBuilder, ErrorKind, RequestSpec, TransportErrorKind};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

mod common;
use common::helpers::*;

#[derive(Debug, Serialize)]
struct Order {
    sku: String,
    quantity: u32,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Receipt {
    id: u64,
}

#[test]
fn test_end_to_end_retry_over_loopback() {
    init_tracing();
    let server = TestServer::start(vec![
        (503, r#"{"error":"busy"}"#),
        (503, r#"{"error":"busy"}"#),
        (200, r#"{"id":77}"#),
    ]);
    let engine = EngineBuilder::new()
        .backoff(fast_backoff())
        .http_client_config(loopback_client_config())
        .build()
        .expect("Failed to build engine");

    let order = Order {
        sku: "A-1".to_string(),
        quantity: 3,
    };
    let mut receipt: Option<Receipt> = None;
    let response = engine
        .call(
            RequestSpec::post(server.url("orders"))
                .parameter("dry_run", "false")
                .body(&order)
                .response_model(&mut receipt),
        )
        .expect("call should succeed");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.attempts(), 3);
    assert_eq!(receipt, Some(Receipt { id: 77 }));
    assert_eq!(engine.request_count(), 1);

    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.method, "POST");
        assert_eq!(request.target, "/orders?dry_run=false");
        assert_eq!(request.body, br#"{"sku":"A-1","quantity":3}"#.to_vec());
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("accept"), Some("application/json"));
        assert_eq!(request.header("content-length"), Some("26"));
    }
}

#[test]
fn test_status_error_over_loopback() {
    let server = TestServer::start(vec![(422, r#"{"error":"quantity"}"#)]);
    let engine = EngineBuilder::new()
        .backoff(fast_backoff())
        .http_client_config(loopback_client_config())
        .build()
        .unwrap();

    let error = engine
        .call(RequestSpec::get(server.url("orders/1")))
        .unwrap_err();

    assert_eq!(
        error.kind(),
        ErrorKind::Status(StatusCode::UNPROCESSABLE_ENTITY)
    );
    assert_eq!(error.response().unwrap().text(), r#"{"error":"quantity"}"#);
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_connection_refused_is_not_retried() {
    let addr = unused_local_addr();
    let engine = EngineBuilder::new()
        .backoff(fast_backoff())
        .http_client_config(loopback_client_config())
        .build()
        .unwrap();

    let error = engine
        .call(RequestSpec::get(format!("http://{}/orders", addr)))
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Transport(TransportErrorKind::Connect));
    assert_eq!(error.attempts(), 1);
    assert!(error.response().is_none());
    assert_eq!(engine.request_count(), 1);
}

#[test]
fn test_connect_timeout_is_retried_over_loopback() {
    init_tracing();
    let (listener, _backlog) = saturated_listener();
    let addr = listener.local_addr().unwrap();
    let engine = EngineBuilder::new()
        .max_retries(1)
        .backoff(fast_backoff())
        .http_client_config(HttpClientConfig {
            connect_timeout: Some(Duration::from_millis(300)),
            ..loopback_client_config()
        })
        .build()
        .unwrap();

    let error = engine
        .call(RequestSpec::get(format!("http://{}/orders", addr)))
        .unwrap_err();

    assert_eq!(
        error.kind(),
        ErrorKind::Transport(TransportErrorKind::ConnectTimeout)
    );
    assert_eq!(error.attempts(), 2);
    assert!(error.response().is_none());
    assert_eq!(engine.request_count(), 1);
}
