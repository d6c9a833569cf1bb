//! Server configuration.
//!
//! Everything is read from `PAYRECON_*` environment variables once, at start-up. Invalid values are logged and
//! replaced with defaults. The resulting structs are passed explicitly to the components that need them.
use std::env;

use log::*;
use payrecon_engine::{db_url, ReconcilerConfig};
use stripe_tools::StripeConfig;

const DEFAULT_PAYRECON_HOST: &str = "127.0.0.1";
const DEFAULT_PAYRECON_PORT: u16 = 8460;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Stripe API and webhook settings
    pub stripe: StripeConfig,
    /// Creation defaults, amount conversion and store timeouts for the reconciler
    pub reconciler: ReconcilerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PAYRECON_HOST.to_string(),
            port: DEFAULT_PAYRECON_PORT,
            database_url: String::default(),
            stripe: StripeConfig::default(),
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PAYRECON_HOST").ok().unwrap_or_else(|| DEFAULT_PAYRECON_HOST.into());
        let port = env::var("PAYRECON_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PAYRECON_PORT. {e} Using the default, {DEFAULT_PAYRECON_PORT}, \
                         instead."
                    );
                    DEFAULT_PAYRECON_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PAYRECON_PORT);
        let database_url = db_url();
        let stripe = StripeConfig::new_from_env_or_default();
        let reconciler = ReconcilerConfig::new_from_env_or_default();
        Self { host, port, database_url, stripe, reconciler }
    }
}
