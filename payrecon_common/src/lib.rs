mod helpers;
mod minor_units;
mod secret;

pub use helpers::parse_decimal;
pub use minor_units::{MinorUnits, DEFAULT_MINOR_UNIT_FACTOR};
pub use secret::Secret;
