//! # Payment reconciliation server
//! This crate hosts the HTTP front end of the reconciliation engine. It is responsible for:
//! * Authenticating Stripe webhook deliveries against the endpoint's signing secret.
//! * Parsing the event body and handing a typed event to the [`payrecon_engine::ReconciliationApi`].
//! * Translating the outcome into the status code the gateway expects: 2xx when the event is settled (including
//!   duplicates and events we ignore), 4xx when it can never succeed, and 5xx when it should be redelivered.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/stripe/webhook`: Stripe webhook deliveries. Requests must carry a valid `Stripe-Signature` header.
//! * `/api/confirm-session`: Direct confirmation of a checkout session by the storefront's success page.
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
