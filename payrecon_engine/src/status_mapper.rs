//! Translates a payment event into what it says about its order.
//!
//! | event                                        | order status    | payment status            |
//! |----------------------------------------------|-----------------|---------------------------|
//! | `payment_intent.created`                     | pending_payment | pending                   |
//! | `payment_intent.processing`                  | processing      | processing                |
//! | `charge.succeeded`                           | processing      | processing                |
//! | `payment_intent.succeeded`                   | paid            | paid                      |
//! | `checkout.session.completed` (paid)          | paid            | paid                      |
//! | `checkout.session.completed` (unpaid)        | pending_payment | unpaid                    |
//! | `checkout.session.completed` (no payment)    | pending_payment | no_payment_required       |
//! | `payment_intent.requires_action`             | pending_payment | requires_action           |
//! | `payment_intent.requires_payment_method`     | pending_payment | requires_payment_method   |
//! | `payment_intent.payment_failed`              | failed          | failed                    |
//! | `payment_intent.canceled`                    | canceled        | canceled                  |
//!
//! Anything else maps to `None`.
use crate::{
    db_types::{OrderStatus, PaymentStatus, StatusUpdate},
    events::{ChargeInfo, CheckoutSessionInfo, EventKind, PaymentIntentInfo},
};

pub fn map_event(kind: &EventKind, minor_unit_factor: u32) -> Option<StatusUpdate> {
    use OrderStatus as O;
    use PaymentStatus as P;
    let update = match kind {
        EventKind::IntentCreated(pi) => from_intent(pi, O::PendingPayment, P::Pending, minor_unit_factor),
        EventKind::IntentProcessing(pi) => from_intent(pi, O::Processing, P::Processing, minor_unit_factor),
        EventKind::IntentRequiresAction(pi) => {
            from_intent(pi, O::PendingPayment, P::RequiresAction, minor_unit_factor)
        },
        EventKind::IntentRequiresPaymentMethod(pi) => {
            from_intent(pi, O::PendingPayment, P::RequiresPaymentMethod, minor_unit_factor)
        },
        EventKind::IntentSucceeded(pi) => from_intent(pi, O::Paid, P::Paid, minor_unit_factor),
        EventKind::IntentPaymentFailed(pi) => from_intent(pi, O::Failed, P::Failed, minor_unit_factor),
        EventKind::IntentCanceled(pi) => from_intent(pi, O::Canceled, P::Canceled, minor_unit_factor),
        EventKind::ChargeSucceeded(ch) => from_charge(ch),
        EventKind::CheckoutCompleted(cs) => from_checkout_session(cs, minor_unit_factor),
        EventKind::Unrecognized(_) => return None,
    };
    Some(update)
}

fn from_intent(
    pi: &PaymentIntentInfo,
    order_status: OrderStatus,
    payment_status: PaymentStatus,
    minor_unit_factor: u32,
) -> StatusUpdate {
    StatusUpdate {
        order_status,
        payment_status,
        payment_reference: Some(pi.id.clone()),
        amount: pi.amount.map(|a| a.to_major(minor_unit_factor)),
        currency: pi.currency.clone(),
        customer: pi.customer.clone(),
        authoritative: false,
    }
}

// A charge succeeding means the money is on its way, not that it has settled. The charge amount is not recorded;
// the intent or checkout session carries the order amount.
fn from_charge(ch: &ChargeInfo) -> StatusUpdate {
    StatusUpdate {
        order_status: OrderStatus::Processing,
        payment_status: PaymentStatus::Processing,
        payment_reference: Some(ch.payment_intent_id.clone().unwrap_or_else(|| ch.id.clone())),
        amount: None,
        currency: None,
        customer: ch.customer.clone(),
        authoritative: false,
    }
}

/// Maps a checkout session. Also used for direct session confirmation.
pub fn from_checkout_session(cs: &CheckoutSessionInfo, minor_unit_factor: u32) -> StatusUpdate {
    let (order_status, payment_status) = match cs.payment_status.as_deref() {
        Some("paid") => (OrderStatus::Paid, PaymentStatus::Paid),
        Some("unpaid") => (OrderStatus::PendingPayment, PaymentStatus::Unpaid),
        Some("no_payment_required") => (OrderStatus::PendingPayment, PaymentStatus::NoPaymentRequired),
        _ => (OrderStatus::PendingPayment, PaymentStatus::Unknown),
    };
    StatusUpdate {
        order_status,
        payment_status,
        payment_reference: Some(cs.payment_intent_id.clone().unwrap_or_else(|| cs.session_id.clone())),
        amount: cs.amount_total.map(|a| a.to_major(minor_unit_factor)),
        currency: cs.currency.clone(),
        customer: cs.customer.clone(),
        authoritative: true,
    }
}
