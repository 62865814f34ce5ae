//! Exercises the HTTP clients against an in-process stub backend.

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use common_enums::{OrderType, Size};
use domain_types::{
    errors::ApiClientError,
    orders::{CreateOrderItem, CreateOrderRequest, OrdersQueueQuery},
    types::{ApiSettings, BakongSettings, Proxy},
};
use external_services::{BakongClient, CafeApiClient};
use interfaces::{OrderService, PaymentVerifier};
use khqr::PaymentFingerprint;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const PAID_MD5: &str = "ff05462543fef508c36b7f41de58e898";
const PENDING_MD5: &str = "c1857a60a49160ff6ebe69c8cc300a64";
const BAKONG_TOKEN: &str = "test-token";

async fn verify_khqr(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["md5"] == PAID_MD5 {
        (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {"responseCode": 0, "hash": "h1", "externalRef": "FT100"}
            })),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Payment not verified"})),
        )
    }
}

async fn create_order(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["items"].as_array().map_or(true, Vec::is_empty) {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "No items"})),
        );
    }
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "order": {
                    "id": "o1",
                    "order_number": "A-001",
                    "status": "pending",
                    "order_type": body["order_type"],
                    "total_usd": 2.5,
                    "customer": {"id": "c1", "phone": body["customer_phone"]}
                }
            }
        })),
    )
}

async fn orders_queue(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let status = query.get("status").cloned().unwrap_or_default();
    Json(json!({
        "success": true,
        "data": [
            {"id": "o1", "order_number": "A-001", "status": status},
            {"id": "o2", "order_number": query.get("limit").cloned().unwrap_or_default(), "status": "ready"}
        ]
    }))
}

async fn bakong_md5(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {BAKONG_TOKEN}").as_str());
    if !authorized {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"responseCode": 1, "errorCode": 401, "message": "Unauthorized"})),
        );
    }
    let code = if body["md5"] == PAID_MD5 { json!("000") } else { json!(1) };
    (StatusCode::OK, Json(json!({"responseCode": code})))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/sales/verify-khqr", post(verify_khqr))
        .route("/api/customer/orders", post(create_order))
        .route("/api/cafe/orders", get(orders_queue))
        .route("/bakong/check_transaction_by_md5", post(bakong_md5));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{address}")
}

fn cafe_client(base: &str) -> CafeApiClient {
    cafe_client_at(&format!("{base}/api/"))
}

fn cafe_client_at(base_url: &str) -> CafeApiClient {
    CafeApiClient::new(
        ApiSettings {
            base_url: base_url.parse().unwrap(),
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        Proxy::default(),
    )
}

fn bakong_client(base: &str, token: &str) -> BakongClient {
    BakongClient::new(
        BakongSettings {
            base_url: format!("{base}/bakong/").parse().unwrap(),
            token: token.to_string().into(),
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        Proxy::default(),
    )
}

fn fingerprint(md5: &str) -> PaymentFingerprint {
    PaymentFingerprint::parse(md5).unwrap()
}

#[tokio::test]
async fn verify_reports_paid_and_pending() {
    let client = cafe_client(&spawn_backend().await);

    assert!(client.verify_payment(&fingerprint(PAID_MD5)).await.unwrap());
    assert!(!client.verify_payment(&fingerprint(PENDING_MD5)).await.unwrap());

    let details = client.verify_khqr(&fingerprint(PAID_MD5)).await.unwrap();
    assert_eq!(
        details.data.and_then(|data| data.external_ref).as_deref(),
        Some("FT100")
    );
}

#[tokio::test]
async fn verify_http_errors_are_failures_not_pending() {
    let base = spawn_backend().await;

    let error = cafe_client_at(&format!("{base}/missing/api/"))
        .verify_payment(&fingerprint(PENDING_MD5))
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        ApiClientError::ErrorResponseReceived {
            status_code: 404,
            ..
        }
    ));
    assert!(!error.current_context().is_transport_error());
}

#[tokio::test]
async fn create_order_returns_the_placed_order() {
    let client = cafe_client(&spawn_backend().await);
    let request = CreateOrderRequest {
        customer_phone: "012345678".into(),
        customer_name: Some("Dara".into()),
        items: vec![CreateOrderItem {
            menu_item_id: "m1".into(),
            size: Size::Large,
            quantity: 1,
            customizations: None,
        }],
        order_type: OrderType::Takeaway,
        table_number: None,
        notes: None,
        is_paid: true,
    };

    let order = client.create_order(request.clone()).await.unwrap();
    assert_eq!(order.order_number, "A-001");
    assert_eq!(order.order_type, Some(OrderType::Takeaway));
    assert_eq!(order.customer.map(|customer| customer.phone).as_deref(), Some("012345678"));

    let rejected = client
        .create_order(CreateOrderRequest {
            items: Vec::new(),
            ..request
        })
        .await
        .unwrap_err();
    assert_eq!(
        rejected.current_context(),
        &ApiClientError::Rejected {
            message: "No items".to_string()
        }
    );
}

#[tokio::test]
async fn orders_queue_sends_filter() {
    let client = cafe_client(&spawn_backend().await);
    let orders = client
        .orders_queue(&OrdersQueueQuery::default())
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status, "pending,preparing,ready");
    assert_eq!(orders[1].order_number, "30");
}

#[tokio::test]
async fn bakong_lookup_uses_bearer_token() {
    let base = spawn_backend().await;
    let client = bakong_client(&base, BAKONG_TOKEN);
    assert!(client.verify_payment(&fingerprint(PAID_MD5)).await.unwrap());
    assert!(!client.verify_payment(&fingerprint(PENDING_MD5)).await.unwrap());

    let error = bakong_client(&base, "wrong")
        .verify_payment(&fingerprint(PAID_MD5))
        .await
        .unwrap_err();
    assert!(matches!(
        error.current_context(),
        ApiClientError::ErrorResponseReceived {
            status_code: 401,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let error = cafe_client(&format!("http://{address}"))
        .verify_payment(&fingerprint(PAID_MD5))
        .await
        .unwrap_err();
    assert!(error.current_context().is_transport_error());
}
