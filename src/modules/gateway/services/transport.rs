use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::core::error::{CieloError, Result};

/// Timeout applied to every webservice call
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("cielo-rs/", env!("CARGO_PKG_VERSION"));

/// Raw gateway reply: HTTP status plus unparsed body.
///
/// A non-2xx status is not an error at this layer. The gateway has been
/// observed answering errors with HTML bodies behind proxy status codes,
/// so the decoder owns the judgment of what a body means.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub http_status: u16,
    pub body: String,
}

/// Sends a rendered payload to the webservice and returns the raw reply
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    async fn send(&self, url: &str, payload: &str) -> Result<RawResponse>;
}

/// reqwest-backed transport posting the single `mensagem` form field
pub struct HttpGatewayTransport {
    client: Client,
}

impl HttpGatewayTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpGatewayTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GatewayTransport for HttpGatewayTransport {
    async fn send(&self, url: &str, payload: &str) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .timeout(REQUEST_TIMEOUT)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .form(&[("mensagem", payload)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CieloError::transport(format!("gateway timed out: {}", e))
                } else if e.is_connect() {
                    CieloError::transport(format!("gateway connection failed: {}", e))
                } else {
                    CieloError::transport(format!("gateway request failed: {}", e))
                }
            })?;

        let http_status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| CieloError::transport(format!("failed to read gateway response: {}", e)))?;

        Ok(RawResponse { http_status, body })
    }
}
