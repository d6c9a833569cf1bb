use actix_web::http::StatusCode;
use payrecon_engine::{
    db_types::{EventId, OrderKey, OrderStatus, PaymentStatus},
    ReconciliationDatabase,
};
use serde_json::Value;

use super::{
    helpers::{get_request, new_api, post_request, sign},
    mocks::{session, MockGateway},
};

const WEBHOOK: &str = "/stripe/webhook";

fn intent_event(event_id: &str, event_type: &str, pi: &str, order_id: &str) -> String {
    serde_json::json!({
        "id": event_id,
        "type": event_type,
        "created": 1718000000,
        "livemode": false,
        "data": { "object": {
            "id": pi,
            "object": "payment_intent",
            "amount": 3500,
            "currency": "aed",
            "metadata": { "order_id": order_id },
            "receipt_email": "buyer@example.com"
        }}
    })
    .to_string()
}

fn charge_event(event_id: &str, charge: &str, pi: &str) -> String {
    serde_json::json!({
        "id": event_id,
        "type": "charge.succeeded",
        "data": { "object": { "id": charge, "object": "charge", "amount": 3500, "payment_intent": pi } }
    })
    .to_string()
}

#[actix_web::test]
async fn health_check() {
    let api = new_api(MockGateway::default()).await;
    let (status, body) = get_request(api, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn signed_payment_succeeded() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let body = intent_event("evt_1", "payment_intent.succeeded", "pi_1", "order-1");
    let (status, res) = post_request(api, WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(ack["received"], true);
    assert_eq!(ack["order_id"], "order-1");
    assert_eq!(ack["status"], "paid");
    assert_eq!(ack["payment_status"], "paid");

    let order = db.fetch_order(&OrderKey::from("order-1")).await.unwrap().expect("Order should exist");
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.payment_status, PaymentStatus::Paid);
    assert_eq!(order.payment_reference.as_deref(), Some("pi_1"));
    assert_eq!(order.amount.unwrap().to_string(), "35.00");
    assert_eq!(order.customer.email.as_deref(), Some("buyer@example.com"));
    assert!(db.is_event_processed(&EventId::from("evt_1")).await.unwrap());
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let body = intent_event("evt_2", "payment_intent.succeeded", "pi_2", "order-2");
    let signature = sign(&body);
    let tampered = body.replace("3500", "1");
    let (status, res) = post_request(api, WEBHOOK, &tampered, Some(&signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("Webhook signature verification failed"), "{res}");
    assert!(!db.is_event_processed(&EventId::from("evt_2")).await.unwrap());
    assert!(db.fetch_order(&OrderKey::from("order-2")).await.unwrap().is_none());
}

#[actix_web::test]
async fn missing_signature_is_rejected() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let body = intent_event("evt_3", "payment_intent.succeeded", "pi_3", "order-3");
    let (status, res) = post_request(api, WEBHOOK, &body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("No signature header"), "{res}");
    assert!(!db.is_event_processed(&EventId::from("evt_3")).await.unwrap());
}

#[actix_web::test]
async fn stale_signature_is_rejected() {
    let api = new_api(MockGateway::default()).await;
    let body = intent_event("evt_4", "payment_intent.succeeded", "pi_4", "order-4");
    let ts = chrono::Utc::now().timestamp() - 3600;
    let signature = stripe_tools::signature_header(super::helpers::WEBHOOK_SECRET, ts, body.as_bytes()).unwrap();
    let (status, _) = post_request(api, WEBHOOK, &body, Some(&signature)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn malformed_event_is_rejected() {
    let api = new_api(MockGateway::default()).await;
    let body = r#"{"id": "evt_5", "type": "payment_intent.succeeded""#;
    let (status, res) = post_request(api, WEBHOOK, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(res.contains("The event could not be parsed"), "{res}");
}

#[actix_web::test]
async fn duplicate_delivery_is_acknowledged() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let body = intent_event("evt_6", "payment_intent.succeeded", "pi_6", "order-6");
    let (status, _) = post_request(api.clone(), WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    let first = db.fetch_order(&OrderKey::from("order-6")).await.unwrap().unwrap();

    let (status, res) = post_request(api, WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(ack["message"], "Event already processed");
    let second = db.fetch_order(&OrderKey::from("order-6")).await.unwrap().unwrap();
    assert_eq!(first.updated_at, second.updated_at);
}

#[actix_web::test]
async fn unhandled_event_type_is_acknowledged() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let body = r#"{"id":"evt_7","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
    let (status, res) = post_request(api, WEBHOOK, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(ack["received"], true);
    assert!(ack.get("order_id").is_none());
    let entry = db.fetch_ledger_entry(&EventId::from("evt_7")).await.unwrap().expect("Event should be recorded");
    assert_eq!(entry.event_type, "customer.created");
    assert!(entry.order_key.is_none());
}

#[actix_web::test]
async fn charge_is_resolved_through_the_gateway() {
    let api = new_api(MockGateway::default().with_intent("pi_8", "order-8")).await;
    let db = api.db().clone();
    let body = charge_event("evt_8", "ch_8", "pi_8");
    let (status, _) = post_request(api, WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    let order = db.fetch_order(&OrderKey::from("order-8")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_reference.as_deref(), Some("pi_8"));
    // Created from a charge, so the configured default price applies
    assert_eq!(order.amount.unwrap().to_string(), "35.00");
}

#[actix_web::test]
async fn gateway_outage_asks_for_redelivery() {
    let api = new_api(MockGateway::unavailable()).await;
    let db = api.db().clone();
    let body = charge_event("evt_9", "ch_9", "pi_9");
    let (status, _) = post_request(api, WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(!db.is_event_processed(&EventId::from("evt_9")).await.unwrap());
}

#[actix_web::test]
async fn checkout_session_without_metadata_is_expanded() {
    let gateway = MockGateway::default().with_session(session("cs_10", Some("order-10"), "paid"));
    let api = new_api(gateway).await;
    let db = api.db().clone();
    let body = r#"{"id":"evt_10","type":"checkout.session.completed","data":{"object":{"id":"cs_10","payment_status":"paid"}}}"#;
    let (status, res) = post_request(api, WEBHOOK, body, Some(&sign(body))).await;
    assert_eq!(status, StatusCode::OK, "{res}");
    let order = db.fetch_order(&OrderKey::from("order-10")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(order.amount.unwrap().to_string(), "42.00");
    assert_eq!(order.customer.name.as_deref(), Some("Buyer"));
}

#[actix_web::test]
async fn store_failure_asks_for_redelivery() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    sqlx::query(
        "CREATE TRIGGER refuse_order BEFORE INSERT ON orders WHEN NEW.order_key = 'order-11' BEGIN SELECT \
         RAISE(ABORT, 'refused'); END;",
    )
    .execute(db.pool())
    .await
    .unwrap();
    let body = intent_event("evt_11", "payment_intent.succeeded", "pi_11", "order-11");
    let (status, res) = post_request(api.clone(), WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(res.contains("error"), "{res}");
    // Nothing was committed, so the redelivery is processed normally
    assert!(!db.is_event_processed(&EventId::from("evt_11")).await.unwrap());
    sqlx::query("DROP TRIGGER refuse_order").execute(db.pool()).await.unwrap();
    let (status, _) = post_request(api, WEBHOOK, &body, Some(&sign(&body))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(db.is_event_processed(&EventId::from("evt_11")).await.unwrap());
}

#[actix_web::test]
async fn late_processing_event_does_not_reopen_a_paid_order() {
    let api = new_api(MockGateway::default()).await;
    let db = api.db().clone();
    let paid = intent_event("evt_12a", "payment_intent.succeeded", "pi_12", "order-12");
    let (status, _) = post_request(api.clone(), WEBHOOK, &paid, Some(&sign(&paid))).await;
    assert_eq!(status, StatusCode::OK);
    let late = intent_event("evt_12b", "payment_intent.processing", "pi_12", "order-12");
    let (status, res) = post_request(api, WEBHOOK, &late, Some(&sign(&late))).await;
    assert_eq!(status, StatusCode::OK);
    let ack: Value = serde_json::from_str(&res).unwrap();
    assert_eq!(ack["status"], "paid");
    let order = db.fetch_order(&OrderKey::from("order-12")).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert!(db.is_event_processed(&EventId::from("evt_12b")).await.unwrap());
}
