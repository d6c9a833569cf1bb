//! Provider-agnostic payment events.
//!
//! Gateway glue parses its wire format and builds a [`PaymentEvent`]. Each [`EventKind`] variant carries only the
//! fields its status mapping needs, so nothing downstream has to inspect loose payloads.
use payrecon_common::MinorUnits;

use crate::db_types::{CustomerDetails, EventId, OrderKey};

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    pub event_id: EventId,
    pub kind: EventKind,
}

impl PaymentEvent {
    pub fn new(event_id: EventId, kind: EventKind) -> Self {
        Self { event_id, kind }
    }

    /// The gateway's name for this event type, e.g. `payment_intent.succeeded`.
    pub fn event_type(&self) -> &str {
        self.kind.event_type()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    IntentCreated(PaymentIntentInfo),
    IntentProcessing(PaymentIntentInfo),
    IntentRequiresAction(PaymentIntentInfo),
    IntentRequiresPaymentMethod(PaymentIntentInfo),
    IntentSucceeded(PaymentIntentInfo),
    IntentPaymentFailed(PaymentIntentInfo),
    IntentCanceled(PaymentIntentInfo),
    ChargeSucceeded(ChargeInfo),
    CheckoutCompleted(CheckoutSessionInfo),
    /// Any event type we do not act on. It is acknowledged and recorded, but never mutates an order.
    Unrecognized(String),
}

impl EventKind {
    pub fn event_type(&self) -> &str {
        match self {
            Self::IntentCreated(_) => "payment_intent.created",
            Self::IntentProcessing(_) => "payment_intent.processing",
            Self::IntentRequiresAction(_) => "payment_intent.requires_action",
            Self::IntentRequiresPaymentMethod(_) => "payment_intent.requires_payment_method",
            Self::IntentSucceeded(_) => "payment_intent.succeeded",
            Self::IntentPaymentFailed(_) => "payment_intent.payment_failed",
            Self::IntentCanceled(_) => "payment_intent.canceled",
            Self::ChargeSucceeded(_) => "charge.succeeded",
            Self::CheckoutCompleted(_) => "checkout.session.completed",
            Self::Unrecognized(t) => t.as_str(),
        }
    }

    /// The order key carried by the event payload itself, if any.
    pub fn order_key(&self) -> Option<&OrderKey> {
        match self {
            Self::IntentCreated(pi) |
            Self::IntentProcessing(pi) |
            Self::IntentRequiresAction(pi) |
            Self::IntentRequiresPaymentMethod(pi) |
            Self::IntentSucceeded(pi) |
            Self::IntentPaymentFailed(pi) |
            Self::IntentCanceled(pi) => pi.order_key.as_ref(),
            Self::ChargeSucceeded(ch) => ch.order_key.as_ref(),
            Self::CheckoutCompleted(cs) => cs.order_key.as_ref(),
            Self::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentIntentInfo {
    pub id: String,
    pub order_key: Option<OrderKey>,
    pub amount: Option<MinorUnits>,
    pub currency: Option<String>,
    pub customer: CustomerDetails,
}

impl PaymentIntentInfo {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_order_key(mut self, key: OrderKey) -> Self {
        self.order_key = Some(key);
        self
    }

    pub fn with_amount(mut self, amount: MinorUnits, currency: &str) -> Self {
        self.amount = Some(amount);
        self.currency = Some(currency.to_string());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargeInfo {
    pub id: String,
    pub payment_intent_id: Option<String>,
    pub order_key: Option<OrderKey>,
    pub customer: CustomerDetails,
}

impl ChargeInfo {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), ..Default::default() }
    }

    pub fn with_payment_intent<S: Into<String>>(mut self, id: S) -> Self {
        self.payment_intent_id = Some(id.into());
        self
    }

    pub fn with_order_key(mut self, key: OrderKey) -> Self {
        self.order_key = Some(key);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutSessionInfo {
    pub session_id: String,
    /// The gateway's session payment status: `paid`, `unpaid` or `no_payment_required`.
    pub payment_status: Option<String>,
    pub order_key: Option<OrderKey>,
    pub payment_intent_id: Option<String>,
    pub amount_total: Option<MinorUnits>,
    pub currency: Option<String>,
    pub customer: CustomerDetails,
}

impl CheckoutSessionInfo {
    pub fn new<S: Into<String>>(session_id: S) -> Self {
        Self { session_id: session_id.into(), ..Default::default() }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}
