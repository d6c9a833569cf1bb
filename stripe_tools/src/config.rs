use std::{env, time::Duration};

use log::*;
use payrecon_common::Secret;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com/v1";
const DEFAULT_SIGNATURE_TOLERANCE: Duration = Duration::from_secs(300);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_url: String,
    /// True when the test-mode keys are in use.
    pub test_mode: bool,
    pub secret_key: Secret<String>,
    pub webhook_secret: Secret<String>,
    /// How far the `t=` timestamp in a webhook signature may drift from the local clock.
    pub signature_tolerance: Duration,
    /// Per-request timeout for API look-ups.
    pub request_timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            test_mode: false,
            secret_key: Secret::default(),
            webhook_secret: Secret::default(),
            signature_tolerance: DEFAULT_SIGNATURE_TOLERANCE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl StripeConfig {
    /// Loads the configuration from `PAYRECON_STRIPE_*` variables.
    ///
    /// When `PAYRECON_STRIPE_MODE=test`, the `_TEST` variants of the secrets are preferred if they are set.
    pub fn new_from_env_or_default() -> Self {
        let test_mode = env::var("PAYRECON_STRIPE_MODE").map(|s| s.trim().eq_ignore_ascii_case("test")).unwrap_or(false);
        if test_mode {
            info!("💳️ Stripe is running in test mode.");
        }
        let api_url = env::var("PAYRECON_STRIPE_API_URL").unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
        let secret_key = Secret::new(mode_var("PAYRECON_STRIPE_SECRET_KEY", test_mode).unwrap_or_else(|| {
            warn!("💳️ PAYRECON_STRIPE_SECRET_KEY is not set. Gateway look-ups will fail.");
            String::default()
        }));
        let webhook_secret = Secret::new(mode_var("PAYRECON_STRIPE_WEBHOOK_SECRET", test_mode).unwrap_or_else(|| {
            error!(
                "💳️ PAYRECON_STRIPE_WEBHOOK_SECRET is not set. Every webhook will be rejected until it is configured."
            );
            String::default()
        }));
        let signature_tolerance =
            seconds_var("PAYRECON_SIGNATURE_TOLERANCE").unwrap_or(DEFAULT_SIGNATURE_TOLERANCE);
        let request_timeout = seconds_var("PAYRECON_GATEWAY_TIMEOUT").unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        Self { api_url, test_mode, secret_key, webhook_secret, signature_tolerance, request_timeout }
    }
}

fn mode_var(name: &str, test_mode: bool) -> Option<String> {
    let test_value = test_mode.then(|| env::var(format!("{name}_TEST")).ok()).flatten().filter(|s| !s.is_empty());
    test_value.or_else(|| env::var(name).ok().filter(|s| !s.is_empty()))
}

fn seconds_var(name: &str) -> Option<Duration> {
    let value = env::var(name).ok()?;
    match value.trim().parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(e) => {
            warn!("🪛️ Invalid configuration value for {name} ({value}). {e}. Using the default.");
            None
        },
    }
}
