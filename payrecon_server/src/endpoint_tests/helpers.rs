use std::time::Duration;

use actix_web::{body::to_bytes, http::StatusCode, test, test::TestRequest, App};
use chrono::Utc;
use log::debug;
use payrecon_common::Secret;
use payrecon_engine::{
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    ReconcilerConfig,
    ReconciliationApi,
    SqliteDatabase,
};
use stripe_tools::{signature_header, WebhookVerifier, SIGNATURE_HEADER};

use super::mocks::MockGateway;
use crate::server::configure_routes;

// A throwaway signing secret. DO NOT re-use it anywhere.
pub const WEBHOOK_SECRET: &str = "whsec_test_c2VjcmV0IGZvciB0ZXN0cw";

pub type TestApi = ReconciliationApi<SqliteDatabase, MockGateway>;

pub async fn new_api(gateway: MockGateway) -> TestApi {
    let db = prepare_test_env(&random_db_path()).await;
    ReconciliationApi::new(db, gateway, ReconcilerConfig::default())
}

pub fn verifier() -> WebhookVerifier {
    WebhookVerifier::new(Secret::new(WEBHOOK_SECRET.to_string()), Duration::from_secs(300))
}

/// A valid `Stripe-Signature` header for `body`, signed now.
pub fn sign(body: &str) -> String {
    signature_header(WEBHOOK_SECRET, Utc::now().timestamp(), body.as_bytes()).expect("Failed to sign payload")
}

pub async fn get_request(api: TestApi, path: &str) -> (StatusCode, String) {
    send(api, TestRequest::get().uri(path)).await
}

/// Posts `body` to `path`, adding a `Stripe-Signature` header if one is given.
pub async fn post_request(api: TestApi, path: &str, body: &str, signature: Option<&str>) -> (StatusCode, String) {
    let mut req = TestRequest::post().uri(path).insert_header(("Content-Type", "application/json"));
    if let Some(sig) = signature {
        req = req.insert_header((SIGNATURE_HEADER, sig));
    }
    send(api, req.set_payload(body.to_string())).await
}

// Errors raised in middleware come back from the service as `Err`, rather than as an error response, so both paths are
// rendered the same way here.
async fn send(api: TestApi, req: TestRequest) -> (StatusCode, String) {
    let verifier = verifier();
    let app = App::new().configure(move |cfg| configure_routes(cfg, api, verifier));
    let service = test::init_service(app).await;
    debug!("Making request");
    match test::try_call_service(&service, req.to_request()).await {
        Ok(res) => {
            let status = res.status();
            let body = to_bytes(res.into_body()).await.expect("Failed to read response body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = to_bytes(res.into_body()).await.expect("Failed to read error body");
            (status, String::from_utf8_lossy(&body).into_owned())
        },
    }
}
