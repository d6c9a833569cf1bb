//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every database and gateway call in these handlers is async, and the
//! engine bounds each store call with a timeout.
//!
//! A note about status codes:
//! Stripe retries any delivery that does not get a 2xx. So a webhook handler returns
//! * 200 when the event is settled, including duplicates and events that change nothing,
//! * 400 when the delivery can never succeed (bad signature, unparseable body), and
//! * 5xx when the event should be redelivered (store or gateway failure). Nothing is committed in that case.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use payrecon_engine::{GatewayLookup, ReconciliationApi, ReconciliationDatabase};
use stripe_tools::StripeEvent;

use crate::{
    data_objects::{ConfirmSessionRequest, ConfirmSessionResponse, WebhookAck},
    errors::ServerError,
    integrations::stripe::payment_event_from_stripe,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Stripe  ----------------------------------------------------
route!(stripe_webhook => Post "/webhook" impl ReconciliationDatabase, GatewayLookup);
/// Route handler for Stripe webhook deliveries.
///
/// The signature has already been checked by the middleware wrapping this route, so the body is trusted here.
pub async fn stripe_webhook<B, G>(
    body: web::Bytes,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
    G: GatewayLookup,
{
    trace!("💻️ Received webhook delivery");
    let event = StripeEvent::from_slice(body.as_ref()).map_err(|e| {
        warn!("💻️ Could not parse webhook body. {e}");
        ServerError::MalformedEvent(e.to_string())
    })?;
    debug!("💻️ Webhook event {} ({})", event.id, event.event_type);
    let event = payment_event_from_stripe(event);
    let result = api.process_event(event).await?;
    Ok(HttpResponse::Ok().json(WebhookAck::from(&result)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(confirm_session => Post "/confirm-session" impl ReconciliationDatabase, GatewayLookup);
/// Route handler for direct confirmation of a checkout session.
///
/// The storefront's success page calls this with the session id it was redirected with. The session is fetched from
/// Stripe, so the request body is not trusted for anything but the id. Unpaid sessions, or sessions without an order
/// key, are rejected with a 400.
pub async fn confirm_session<B, G>(
    body: web::Json<ConfirmSessionRequest>,
    api: web::Data<ReconciliationApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: ReconciliationDatabase,
    G: GatewayLookup,
{
    let session_id = body.session_id.trim();
    if session_id.is_empty() {
        return Err(ServerError::InvalidRequestBody("session_id is required".into()));
    }
    debug!("💻️ Confirming checkout session {session_id}");
    let order = api.confirm_session(session_id).await?;
    Ok(HttpResponse::Ok().json(ConfirmSessionResponse::from(&order)))
}
