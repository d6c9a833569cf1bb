//! Stripe tooling for the reconciliation server.
//!
//! * [`StripeEvent`] parses a webhook body into a typed event. The event object is decoded according to the event
//!   type, so downstream code never has to poke around in loose JSON.
//! * [`WebhookVerifier`] checks the `Stripe-Signature` header against the raw body.
//! * [`StripeApi`] is a small REST client used to look up objects that a webhook only references by id.
mod api;
mod config;
mod data_objects;
mod error;
mod event;
mod signature;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{
    BillingDetails,
    Charge,
    CheckoutSession,
    CustomerDetails,
    Expandable,
    HasId,
    PaymentIntent,
    ORDER_ID_METADATA_KEY,
};
pub use error::StripeApiError;
pub use event::{EventObject, StripeEvent};
pub use signature::{signature_header, WebhookSignatureError, WebhookVerifier, SIGNATURE_HEADER};
