use tracing::info;

use crate::config::{Environment, Merchant};
use crate::core::error::{CieloError, Result};
use crate::modules::gateway::services::{decoder, payload};
use crate::modules::gateway::services::transport::{GatewayTransport, HttpGatewayTransport};
use crate::modules::tokens::models::CardToken;
use crate::modules::transactions::models::request::RawCardData;

/// Exchanges raw card data for a reusable gateway token
pub struct TokenService<T: GatewayTransport = HttpGatewayTransport> {
    merchant: Merchant,
    environment: Environment,
    transport: T,
}

impl TokenService<HttpGatewayTransport> {
    pub fn new(merchant: Merchant, environment: Environment) -> Self {
        Self::with_transport(merchant, environment, HttpGatewayTransport::new())
    }
}

impl<T: GatewayTransport> TokenService<T> {
    pub fn with_transport(merchant: Merchant, environment: Environment, transport: T) -> Self {
        Self {
            merchant,
            environment,
            transport,
        }
    }

    /// Creates a token for the given card.
    ///
    /// Unlike authorization, tokenization has no partial-success outcome:
    /// any failure is an error.
    pub async fn create(&self, card: &RawCardData) -> Result<CardToken> {
        let payload = payload::tokenize(&self.merchant, card)?;
        info!("requesting card tokenization");

        let raw = self
            .transport
            .send(self.environment.endpoint(), &payload)
            .await?;
        let decoded = decoder::decode(&raw)?;

        if decoded.root != "retorno-token" {
            return Err(CieloError::response_format(
                raw.http_status,
                format!("expected retorno-token, got '{}'", decoded.root),
                raw.body.clone(),
            ));
        }
        let tree = decoded.tree.get("dados-token").ok_or_else(|| {
            CieloError::response_format(
                raw.http_status,
                "retorno-token without dados-token",
                raw.body.clone(),
            )
        })?;
        CardToken::from_tree(tree).ok_or_else(|| {
            CieloError::response_format(
                raw.http_status,
                "dados-token without codigo-token",
                raw.body.clone(),
            )
        })
    }
}
