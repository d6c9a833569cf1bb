use std::collections::HashMap;

use payrecon_common::MinorUnits;
use payrecon_engine::{
    db_types::{CustomerDetails, OrderKey},
    events::CheckoutSessionInfo,
    GatewayLookup,
    GatewayLookupError,
};

/// A gateway that answers look-ups from fixed tables instead of calling Stripe.
#[derive(Clone, Default)]
pub struct MockGateway {
    pub intents: HashMap<String, OrderKey>,
    pub sessions: HashMap<String, CheckoutSessionInfo>,
    pub unavailable: bool,
}

impl MockGateway {
    pub fn with_intent(mut self, pi: &str, key: &str) -> Self {
        self.intents.insert(pi.to_string(), OrderKey::from(key));
        self
    }

    pub fn with_session(mut self, session: CheckoutSessionInfo) -> Self {
        self.sessions.insert(session.session_id.clone(), session);
        self
    }

    pub fn unavailable() -> Self {
        Self { unavailable: true, ..Default::default() }
    }
}

impl GatewayLookup for MockGateway {
    async fn order_key_for_payment_intent(&self, id: &str) -> Result<Option<OrderKey>, GatewayLookupError> {
        if self.unavailable {
            return Err(GatewayLookupError::new("connection refused", true));
        }
        Ok(self.intents.get(id).cloned())
    }

    async fn checkout_session(&self, session_id: &str) -> Result<CheckoutSessionInfo, GatewayLookupError> {
        if self.unavailable {
            return Err(GatewayLookupError::new("connection refused", true));
        }
        self.sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayLookupError::new(format!("No such checkout.session: '{session_id}'"), false))
    }
}

pub fn session(session_id: &str, key: Option<&str>, payment_status: &str) -> CheckoutSessionInfo {
    CheckoutSessionInfo {
        session_id: session_id.to_string(),
        payment_status: Some(payment_status.to_string()),
        order_key: key.map(OrderKey::from),
        payment_intent_id: Some(format!("pi_{session_id}")),
        amount_total: Some(MinorUnits::from(4200)),
        currency: Some("aed".into()),
        customer: CustomerDetails::default().with_email("buyer@example.com").with_name("Buyer"),
    }
}
