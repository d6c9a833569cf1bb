//! The contracts that reconciliation backends and gateway integrations must fulfil.
//!
//! * [`ReconciliationDatabase`] owns the idempotency ledger and the order store. Its `reconcile_*` methods must read,
//!   plan and write the order atomically.
//! * [`GatewayLookup`] performs the synchronous gateway queries needed to resolve events whose payload lacks the
//!   order key.
mod data_objects;
mod gateway_lookup;
mod reconciliation_database;

pub use data_objects::{Admission, EventOutcome, ReconcileOutcome};
pub use gateway_lookup::{GatewayLookup, GatewayLookupError};
pub use reconciliation_database::ReconciliationDatabase;
