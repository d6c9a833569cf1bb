//! Glue between the Stripe wire types and the provider-agnostic engine.
use log::*;
use payrecon_engine::{
    db_types::{CustomerDetails, EventId, OrderKey},
    events::{ChargeInfo, CheckoutSessionInfo, EventKind, PaymentEvent, PaymentIntentInfo},
    GatewayLookup,
    GatewayLookupError,
};
use stripe_tools::{Charge, CheckoutSession, EventObject, PaymentIntent, StripeApi, StripeApiError, StripeEvent};

/// Converts a parsed webhook event into an engine event. Event types we do not act on, or whose object does not
/// match their type, become [`EventKind::Unrecognized`].
pub fn payment_event_from_stripe(event: StripeEvent) -> PaymentEvent {
    let kind = match (event.event_type.as_str(), event.object) {
        ("payment_intent.created", EventObject::PaymentIntent(pi)) => EventKind::IntentCreated(intent_info(&pi)),
        ("payment_intent.processing", EventObject::PaymentIntent(pi)) => {
            EventKind::IntentProcessing(intent_info(&pi))
        },
        ("payment_intent.requires_action", EventObject::PaymentIntent(pi)) => {
            EventKind::IntentRequiresAction(intent_info(&pi))
        },
        ("payment_intent.requires_payment_method", EventObject::PaymentIntent(pi)) => {
            EventKind::IntentRequiresPaymentMethod(intent_info(&pi))
        },
        ("payment_intent.succeeded", EventObject::PaymentIntent(pi)) => EventKind::IntentSucceeded(intent_info(&pi)),
        ("payment_intent.payment_failed", EventObject::PaymentIntent(pi)) => {
            EventKind::IntentPaymentFailed(intent_info(&pi))
        },
        ("payment_intent.canceled", EventObject::PaymentIntent(pi)) => EventKind::IntentCanceled(intent_info(&pi)),
        ("charge.succeeded", EventObject::Charge(ch)) => EventKind::ChargeSucceeded(charge_info(&ch)),
        ("checkout.session.completed", EventObject::CheckoutSession(cs)) => {
            EventKind::CheckoutCompleted(session_info(&cs))
        },
        (other, _) => {
            trace!("💳️ Event type {other} is not handled");
            EventKind::Unrecognized(other.to_string())
        },
    };
    PaymentEvent::new(EventId::from(event.id), kind)
}

pub fn intent_info(pi: &PaymentIntent) -> PaymentIntentInfo {
    let customer = CustomerDetails { email: pi.receipt_email.clone(), ..Default::default() };
    PaymentIntentInfo {
        id: pi.id.clone(),
        order_key: pi.order_id().map(OrderKey::from),
        amount: pi.amount,
        currency: pi.currency.clone(),
        customer,
    }
}

pub fn charge_info(ch: &Charge) -> ChargeInfo {
    let customer = ch
        .billing_details
        .as_ref()
        .map(|b| CustomerDetails { email: b.email.clone(), name: b.name.clone(), phone: b.phone.clone() })
        .unwrap_or_default();
    ChargeInfo {
        id: ch.id.clone(),
        payment_intent_id: ch.payment_intent_id().map(String::from),
        order_key: ch.order_id().map(OrderKey::from),
        customer,
    }
}

pub fn session_info(cs: &CheckoutSession) -> CheckoutSessionInfo {
    let details = cs.customer_details.as_ref();
    let customer = CustomerDetails {
        email: cs.email().map(String::from),
        name: details.and_then(|d| d.name.clone()),
        phone: details.and_then(|d| d.phone.clone()),
    };
    CheckoutSessionInfo {
        session_id: cs.id.clone(),
        payment_status: cs.payment_status.clone(),
        order_key: cs.order_id().map(OrderKey::from),
        payment_intent_id: cs.payment_intent_id().map(String::from),
        amount_total: cs.amount_total,
        currency: cs.currency.clone(),
        customer,
    }
}

/// [`GatewayLookup`] backed by the Stripe REST API.
#[derive(Clone)]
pub struct StripeGateway(StripeApi);

impl StripeGateway {
    pub fn new(api: StripeApi) -> Self {
        Self(api)
    }
}

fn lookup_error(e: StripeApiError) -> GatewayLookupError {
    warn!("💳️ Stripe look-up failed. {e}");
    GatewayLookupError::new(e.to_string(), e.is_transient())
}

impl GatewayLookup for StripeGateway {
    async fn order_key_for_payment_intent(&self, id: &str) -> Result<Option<OrderKey>, GatewayLookupError> {
        let pi = self.0.get_payment_intent(id).await.map_err(lookup_error)?;
        Ok(pi.order_id().map(OrderKey::from))
    }

    async fn checkout_session(&self, session_id: &str) -> Result<CheckoutSessionInfo, GatewayLookupError> {
        let session = self.0.get_checkout_session(session_id).await.map_err(lookup_error)?;
        Ok(session_info(&session))
    }
}
