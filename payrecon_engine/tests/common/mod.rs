use std::collections::HashMap;

use payrecon_common::MinorUnits;
use payrecon_engine::{
    db_types::{CustomerDetails, EventId, OrderKey},
    events::{ChargeInfo, CheckoutSessionInfo, EventKind, PaymentEvent, PaymentIntentInfo},
    GatewayLookup,
    GatewayLookupError,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    ReconcilerConfig,
    ReconciliationApi,
    SqliteDatabase,
};

pub type TestApi = ReconciliationApi<SqliteDatabase, StubGateway>;

pub async fn new_api(gateway: StubGateway) -> TestApi {
    new_api_with_config(gateway, ReconcilerConfig::default()).await
}

pub async fn new_api_with_config(gateway: StubGateway, config: ReconcilerConfig) -> TestApi {
    let db = prepare_test_env(&random_db_path()).await;
    ReconciliationApi::new(db, gateway, config)
}

/// Answers gateway look-ups from fixed tables.
#[derive(Default)]
pub struct StubGateway {
    pub intents: HashMap<String, OrderKey>,
    pub sessions: HashMap<String, CheckoutSessionInfo>,
    pub unavailable: bool,
}

impl StubGateway {
    pub fn with_intent(mut self, pi: &str, key: &str) -> Self {
        self.intents.insert(pi.to_string(), OrderKey::from(key));
        self
    }

    pub fn with_session(mut self, session: CheckoutSessionInfo) -> Self {
        self.sessions.insert(session.session_id.clone(), session);
        self
    }
}

impl GatewayLookup for StubGateway {
    async fn order_key_for_payment_intent(&self, id: &str) -> Result<Option<OrderKey>, GatewayLookupError> {
        if self.unavailable {
            return Err(GatewayLookupError::new("gateway unavailable", true));
        }
        Ok(self.intents.get(id).cloned())
    }

    async fn checkout_session(&self, session_id: &str) -> Result<CheckoutSessionInfo, GatewayLookupError> {
        if self.unavailable {
            return Err(GatewayLookupError::new("gateway unavailable", true));
        }
        self.sessions.get(session_id).cloned().ok_or_else(|| GatewayLookupError::new("No such session", false))
    }
}

pub fn intent(pi: &str, key: &str) -> PaymentIntentInfo {
    PaymentIntentInfo::new(pi).with_order_key(OrderKey::from(key)).with_amount(MinorUnits::from(3500), "aed")
}

pub fn event(id: &str, kind: EventKind) -> PaymentEvent {
    PaymentEvent::new(EventId::from(id), kind)
}

pub fn charge(id: &str, pi: &str) -> EventKind {
    EventKind::ChargeSucceeded(ChargeInfo::new(id).with_payment_intent(pi))
}

pub fn paid_session(session_id: &str, key: &str) -> CheckoutSessionInfo {
    CheckoutSessionInfo {
        session_id: session_id.to_string(),
        payment_status: Some("paid".into()),
        order_key: Some(OrderKey::from(key)),
        payment_intent_id: Some(format!("pi_for_{session_id}")),
        amount_total: Some(MinorUnits::from(3500)),
        currency: Some("aed".into()),
        customer: CustomerDetails::default().with_email("buyer@example.com").with_name("Buyer"),
    }
}
