use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{config::StripeConfig, CheckoutSession, PaymentIntent, StripeApiError};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let auth = format!("Bearer {}", config.secret_key.reveal());
        let mut val = HeaderValue::from_str(&auth).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if !params.is_empty() {
            req = req.query(params);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    pub async fn get_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeApiError> {
        debug!("💳️ Fetching payment intent {id}");
        let path = format!("/payment_intents/{id}");
        let intent = self.rest_query::<PaymentIntent>(Method::GET, &path, &[]).await?;
        info!("💳️ Fetched payment intent {id}");
        Ok(intent)
    }

    /// Fetches a checkout session with its payment intent and customer expanded.
    pub async fn get_checkout_session(&self, id: &str) -> Result<CheckoutSession, StripeApiError> {
        debug!("💳️ Fetching checkout session {id}");
        let path = format!("/checkout/sessions/{id}");
        let params = [("expand[]", "payment_intent"), ("expand[]", "customer")];
        let session = self.rest_query::<CheckoutSession>(Method::GET, &path, &params).await?;
        info!("💳️ Fetched checkout session {id}");
        Ok(session)
    }
}
