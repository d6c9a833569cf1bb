use actix_web::http::StatusCode;
use payrecon_engine::{
    db_types::{OrderKey, OrderStatus, PaymentStatus},
    ReconciliationDatabase,
};
use serde_json::Value;

use super::{
    helpers::{new_api, post_request},
    mocks::{session, MockGateway},
};

const CONFIRM: &str = "/api/confirm-session";

#[actix_web::test]
async fn paid_session_marks_order_paid() {
    let gateway = MockGateway::default().with_session(session("cs_1", Some("order-1"), "paid"));
    let api = new_api(gateway).await;
    let db = api.db().clone();
    let (status, res) = post_request(api, CONFIRM, r#"{"session_id":"cs_1"}"#, None).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    let body: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["order_id"], "order-1");
    assert_eq!(body["status"], "paid");
    assert_eq!(body["payment_status"], "paid");
    let order = db.fetch_order(&OrderKey::from("order-1")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.payment_reference.as_deref(), Some("pi_cs_1"));
}

#[actix_web::test]
async fn unpaid_session_is_rejected() {
    let gateway = MockGateway::default().with_session(session("cs_2", Some("order-2"), "unpaid"));
    let api = new_api(gateway).await;
    let db = api.db().clone();
    let (status, res) = post_request(api, CONFIRM, r#"{"session_id":"cs_2"}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{res}");
    assert!(db.fetch_order(&OrderKey::from("order-2")).await.unwrap().is_none());
}

#[actix_web::test]
async fn session_without_order_key_is_rejected() {
    let gateway = MockGateway::default().with_session(session("cs_3", None, "paid"));
    let api = new_api(gateway).await;
    let (status, _) = post_request(api, CONFIRM, r#"{"session_id":"cs_3"}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn empty_session_id_is_rejected() {
    let api = new_api(MockGateway::default()).await;
    let (status, res) = post_request(api, CONFIRM, r#"{"session_id":"  "}"#, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("session_id is required"), "{res}");
}

#[actix_web::test]
async fn unknown_session_is_a_gateway_error() {
    let api = new_api(MockGateway::default()).await;
    let (status, _) = post_request(api, CONFIRM, r#"{"session_id":"cs_missing"}"#, None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[actix_web::test]
async fn confirmation_overrides_a_failed_order() {
    let gateway = MockGateway::default().with_session(session("cs_4", Some("order-4"), "paid"));
    let api = new_api(gateway).await;
    let db = api.db().clone();
    let failed = serde_json::json!({
        "id": "evt_4", "type": "payment_intent.payment_failed",
        "data": { "object": { "id": "pi_x", "metadata": { "order_id": "order-4" } } }
    })
    .to_string();
    let sig = super::helpers::sign(&failed);
    let (status, _) = post_request(api.clone(), "/stripe/webhook", &failed, Some(&sig)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_order(&OrderKey::from("order-4")).await.unwrap().unwrap().status, OrderStatus::Failed);

    let (status, _) = post_request(api, CONFIRM, r#"{"session_id":"cs_4"}"#, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(db.fetch_order(&OrderKey::from("order-4")).await.unwrap().unwrap().status, OrderStatus::Paid);
}
