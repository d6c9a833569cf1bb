use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use payrecon_engine::{GatewayLookup, ReconciliationApi, ReconciliationDatabase, SqliteDatabase};
use stripe_tools::{StripeApi, WebhookVerifier};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::stripe::StripeGateway,
    middleware::SignatureMiddlewareFactory,
    routes::{health, ConfirmSessionRoute, StripeWebhookRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.stripe.webhook_secret.is_empty() {
        return Err(ServerError::ConfigurationError("PAYRECON_STRIPE_WEBHOOK_SECRET must be set".into()));
    }
    let api = StripeApi::new(config.stripe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, StripeGateway::new(api))?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: StripeGateway,
) -> Result<Server, ServerError> {
    let verifier = WebhookVerifier::new(config.stripe.webhook_secret.clone(), config.stripe.signature_tolerance);
    let reconciler_config = config.reconciler.clone();
    info!("🚀️ Stripe webhook signatures are checked with a tolerance of {:?}", config.stripe.signature_tolerance);
    let srv = HttpServer::new(move || {
        let api = ReconciliationApi::new(db.clone(), gateway.clone(), reconciler_config.clone());
        let verifier = verifier.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("payrecon::access_log"))
            .configure(|cfg| configure_routes(cfg, api, verifier))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Registers the reconciliation API and every route on `cfg`.
///
/// The webhook route lives in its own scope so that the signature middleware guards it and nothing else.
pub fn configure_routes<B, G>(cfg: &mut web::ServiceConfig, api: ReconciliationApi<B, G>, verifier: WebhookVerifier)
where
    B: ReconciliationDatabase + 'static,
    G: GatewayLookup + 'static,
{
    let stripe_scope = web::scope("/stripe")
        .wrap(SignatureMiddlewareFactory::new(verifier))
        .service(StripeWebhookRoute::<B, G>::new());
    let api_scope = web::scope("/api").service(ConfirmSessionRoute::<B, G>::new());
    cfg.app_data(web::Data::new(api)).service(health).service(stripe_scope).service(api_scope);
}
