use serde::Deserialize;
use serde_json::Value;

use crate::{Charge, CheckoutSession, PaymentIntent, StripeApiError};

/// A webhook event with its `data.object` decoded according to the event type.
#[derive(Debug, Clone)]
pub struct StripeEvent {
    pub id: String,
    pub event_type: String,
    pub object: EventObject,
}

#[derive(Debug, Clone)]
pub enum EventObject {
    PaymentIntent(PaymentIntent),
    Charge(Charge),
    CheckoutSession(CheckoutSession),
    /// The event type is not one we decode. The object is left as-is.
    Other(Value),
}

#[derive(Deserialize)]
struct RawEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: RawEventData,
}

#[derive(Deserialize)]
struct RawEventData {
    object: Value,
}

impl StripeEvent {
    /// Parses a raw webhook body.
    ///
    /// The envelope must be well-formed, and for the event families we handle (`payment_intent.*`, `charge.*`,
    /// `checkout.session.*`) so must the object. Anything else is kept as [`EventObject::Other`].
    pub fn from_slice(body: &[u8]) -> Result<Self, StripeApiError> {
        let raw = serde_json::from_slice::<RawEvent>(body).map_err(|e| StripeApiError::JsonError(e.to_string()))?;
        if raw.id.trim().is_empty() {
            return Err(StripeApiError::JsonError("The event id is empty".into()));
        }
        let object = EventObject::decode(&raw.event_type, raw.data.object)?;
        Ok(Self { id: raw.id, event_type: raw.event_type, object })
    }
}

impl EventObject {
    fn decode(event_type: &str, object: Value) -> Result<Self, StripeApiError> {
        let family = event_type.rsplit_once('.').map(|(family, _)| family).unwrap_or_default();
        let decoded = match family {
            "payment_intent" => Self::PaymentIntent(from_value(object)?),
            "charge" => Self::Charge(from_value(object)?),
            "checkout.session" => Self::CheckoutSession(from_value(object)?),
            _ => Self::Other(object),
        };
        Ok(decoded)
    }
}

fn from_value<T: serde::de::DeserializeOwned>(object: Value) -> Result<T, StripeApiError> {
    serde_json::from_value(object).map_err(|e| StripeApiError::JsonError(e.to_string()))
}
