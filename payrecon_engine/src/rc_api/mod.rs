pub mod errors;
pub mod reconciliation_api;
