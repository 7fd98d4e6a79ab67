//! The CLI's backend client against an in-process stub server.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use chrono::NaiveDate;
use sabore_cli::{BackendClient, ClientError, OrderQuery};
use sabore_core::RestaurantId;
use sabore_integration_tests::{SAMPLE_PAYLOAD, StubBackend, StubResponse};

fn client(stub: &StubBackend, attempts: u32) -> BackendClient {
    BackendClient::new(stub.base_url(), Duration::from_secs(5), attempts).unwrap()
}

#[tokio::test]
async fn test_fetches_from_api_path() {
    let stub = StubBackend::start(vec![StubResponse::json(SAMPLE_PAYLOAD)])
        .await
        .unwrap();

    let snapshot = client(&stub, 1)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 6);
    assert_eq!(snapshot.skipped, 1);
    assert_eq!(stub.requests(), ["/api/pedidos"]);
}

#[tokio::test]
async fn test_falls_back_on_not_found() {
    let stub = StubBackend::start(vec![
        StubResponse::status(404),
        StubResponse::json(r#"{"content": [{"id": 1, "valor_total": 9.9}]}"#),
    ])
    .await
    .unwrap();

    let query = OrderQuery {
        restaurant_id: Some(RestaurantId::from(3_i64)),
        from: NaiveDate::from_ymd_opt(2024, 6, 1),
        to: None,
    };
    let snapshot = client(&stub, 1).fetch_orders(&query).await.unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(
        stub.requests(),
        [
            "/api/pedidos?restaurante_id=3&data_inicio=2024-06-01",
            "/pedidos?restaurante_id=3&data_inicio=2024-06-01",
        ]
    );
}

#[tokio::test]
async fn test_retries_server_errors() {
    let stub = StubBackend::start(vec![
        StubResponse::status(503),
        StubResponse::json("[]"),
    ])
    .await
    .unwrap();

    let snapshot = client(&stub, 3)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap();

    assert!(snapshot.is_empty());
    assert_eq!(stub.requests().len(), 2);
}

#[tokio::test]
async fn test_gives_up_after_attempts() {
    let stub = StubBackend::start(vec![
        StubResponse::status(500),
        StubResponse::status(502),
    ])
    .await
    .unwrap();

    let err = client(&stub, 2)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status, .. } if status.as_u16() == 502));
    assert_eq!(stub.requests().len(), 2);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let stub = StubBackend::start(vec![StubResponse::status(401)])
        .await
        .unwrap();

    let err = client(&stub, 3)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status, .. } if status.as_u16() == 401));
    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn test_rejects_non_json() {
    let stub = StubBackend::start(vec![StubResponse::html("<html>login</html>")])
        .await
        .unwrap();

    let err = client(&stub, 1)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotJson { .. }));
}

#[tokio::test]
async fn test_rejects_payload_without_orders() {
    let stub = StubBackend::start(vec![StubResponse::json(r#"{"message": "ok"}"#)])
        .await
        .unwrap();

    let err = client(&stub, 1)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Snapshot(_)));
}

#[tokio::test]
async fn test_both_paths_missing() {
    let stub = StubBackend::start(Vec::new()).await.unwrap();

    let err = client(&stub, 1)
        .fetch_orders(&OrderQuery::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { status, .. } if status.as_u16() == 404));
    assert_eq!(stub.requests(), ["/api/pedidos", "/pedidos"]);
}
