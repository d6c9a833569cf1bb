//! Webhook signature middleware for Actix Web.
//!
//! Stripe signs every webhook delivery with the endpoint's signing secret and sends the result in the
//! `Stripe-Signature` header. This middleware verifies that header against the raw request body before any handler
//! sees the request. Requests that fail are rejected with a 400 and never reach the reconciliation engine.
//!
//! The body is consumed to compute the signature and then put back, so handlers downstream can still extract it.
use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use stripe_tools::{WebhookVerifier, SIGNATURE_HEADER};

use crate::errors::ServerError;

pub struct SignatureMiddlewareFactory {
    verifier: WebhookVerifier,
}

impl SignatureMiddlewareFactory {
    pub fn new(verifier: WebhookVerifier) -> Self {
        SignatureMiddlewareFactory { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SignatureMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = SignatureMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SignatureMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) }))
    }
}

pub struct SignatureMiddlewareService<S> {
    verifier: WebhookVerifier,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SignatureMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        Box::pin(async move {
            trace!("🔐️ Checking webhook signature for request");
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ServerError::InvalidRequestBody("Failed to extract request data.".into())
            })?;
            let header = req
                .headers()
                .get(SIGNATURE_HEADER)
                .ok_or_else(|| {
                    warn!("🔐️ No webhook signature found in request. Rejecting it.");
                    ServerError::AuthenticationError("No signature header.".into())
                })?
                .to_str()
                .map_err(|_| ServerError::AuthenticationError("The signature header is not valid ASCII.".into()))?
                .to_string();
            match verifier.verify(data.as_ref(), &header) {
                Ok(()) => {
                    trace!("🔐️ Webhook signature check ✅️");
                    req.set_payload(bytes_to_payload(data));
                    service.call(req).await
                },
                Err(e) => {
                    warn!("🔐️ Invalid webhook signature. {e}. Rejecting the request.");
                    Err(ServerError::AuthenticationError(e.to_string()).into())
                },
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
