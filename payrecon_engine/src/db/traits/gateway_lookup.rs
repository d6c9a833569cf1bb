use thiserror::Error;

use crate::{db_types::OrderKey, events::CheckoutSessionInfo};

#[derive(Debug, Clone, Error)]
#[error("Gateway look-up failed: {message}")]
pub struct GatewayLookupError {
    pub message: String,
    /// True if the same request might succeed later (timeouts, rate limits, 5xx responses).
    pub transient: bool,
}

impl GatewayLookupError {
    pub fn new<S: Into<String>>(message: S, transient: bool) -> Self {
        Self { message: message.into(), transient }
    }
}

/// Synchronous queries against the payment gateway.
#[allow(async_fn_in_trait)]
pub trait GatewayLookup {
    /// Fetches the payment intent with the given id and returns the order key stored in its metadata.
    async fn order_key_for_payment_intent(&self, payment_intent_id: &str)
        -> Result<Option<OrderKey>, GatewayLookupError>;

    /// Fetches a checkout session, with its payment intent and customer expanded.
    async fn checkout_session(&self, session_id: &str) -> Result<CheckoutSessionInfo, GatewayLookupError>;
}
