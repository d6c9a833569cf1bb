//! Payment Reconciliation Engine
//!
//! The engine turns a stream of payment gateway notifications into durable order records. Deliveries are
//! at-least-once and arrive in any order, so the engine leans on two things:
//! 1. An idempotency ledger of processed event ids. An event is admitted in the same database transaction that
//!    applies its order mutation, so a failed mutation leaves no trace and the gateway's redelivery is processed
//!    normally.
//! 2. A terminal-state write guard ([`reconciler::plan`]). Once an order is paid, failed or canceled, a stale
//!    event can never drag it backwards.
//!
//! The library is provider-agnostic. Gateway-specific glue converts wire events into [`events::PaymentEvent`] and
//! implements [`GatewayLookup`] for the synchronous look-ups some events need.
//!
//! Database backends implement [`ReconciliationDatabase`]. SQLite is the only backend at present.
mod db;

mod config;
pub mod db_types;
pub mod events;
mod rc_api;
pub mod reconciler;
pub mod status_mapper;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use config::ReconcilerConfig;
#[cfg(feature = "sqlite")]
pub use db::sqlite::{db_url, SqliteDatabase, SqliteDatabaseError};
pub use db::traits::{Admission, EventOutcome, GatewayLookup, GatewayLookupError, ReconcileOutcome, ReconciliationDatabase};
pub use rc_api::{
    errors::ReconciliationError,
    reconciliation_api::{EventResult, ReconciliationApi},
};
