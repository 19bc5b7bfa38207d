use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::{Environment, Merchant};
use crate::core::error::{CieloError, Result};
use crate::modules::gateway::services::transport::{GatewayTransport, HttpGatewayTransport};
use crate::modules::gateway::services::{decoder, payload};
use crate::modules::transactions::models::{Transaction, TransactionRequest};

/// Drives the transaction lifecycle against the gateway webservice.
///
/// Each operation is one bounded network call. Preconditions are checked
/// locally first, so an out-of-order call (a double capture, a capture
/// with nothing to capture) fails before anything is sent.
pub struct TransactionService<T: GatewayTransport = HttpGatewayTransport> {
    merchant: Merchant,
    environment: Environment,
    transport: T,
}

impl TransactionService<HttpGatewayTransport> {
    pub fn new(merchant: Merchant, environment: Environment) -> Self {
        Self::with_transport(merchant, environment, HttpGatewayTransport::new())
    }
}

impl<T: GatewayTransport> TransactionService<T> {
    pub fn with_transport(merchant: Merchant, environment: Environment, transport: T) -> Self {
        Self {
            merchant,
            environment,
            transport,
        }
    }

    /// Requests authorization for a new transaction.
    ///
    /// A decline is a normal outcome, not an error: inspect
    /// [`Transaction::is_authorized`] and [`Transaction::decline`]. A
    /// transaction created in the redirect flow (status 0) must be
    /// completed by the cardholder at [`Transaction::authentication_url`]
    /// and resolved later with [`Self::refresh`].
    pub async fn authorize(&self, request: &TransactionRequest) -> Result<Transaction> {
        let payload = payload::authorize(&self.merchant, request)?;
        info!(order_id = %request.order.id, "requesting authorization");

        let mut transaction = Transaction::new();
        self.roundtrip(&mut transaction, &payload).await?;

        if let Some(reason) = transaction.decline() {
            warn!(
                order_id = %request.order.id,
                code = %reason.code,
                message = %reason.message,
                "authorization declined"
            );
        }
        Ok(transaction)
    }

    /// Captures a previously authorized transaction.
    ///
    /// Legal when this record was authorized and not yet captured, or
    /// when it was created from an explicit transaction id and the
    /// gateway holds the authoritative state.
    pub async fn capture(&self, transaction: &mut Transaction) -> Result<()> {
        if transaction.is_captured() {
            return Err(CieloError::logic("transaction is already captured"));
        }
        let tid = transaction
            .tid()
            .ok_or_else(|| {
                CieloError::logic(
                    "capture requires a previous authorization or an explicit transaction id",
                )
            })?
            .to_string();
        if let Some(status) = transaction.status() {
            if !status.is_authorized() {
                return Err(CieloError::logic(format!(
                    "transaction status '{}' does not allow capture",
                    status
                )));
            }
        }

        let payload = payload::capture(&self.merchant, &tid)?;
        info!(tid = %tid, "requesting capture");
        self.roundtrip(transaction, &payload).await
    }

    /// Cancels an authorized or captured transaction, fully or partially.
    ///
    /// The gateway owns the cancellable amount: over-cancellation and
    /// double cancellation come back as [`CieloError::Gateway`] business
    /// errors rather than being pre-checked here, since partial
    /// cancellations accumulate server-side.
    pub async fn cancel(&self, transaction: &mut Transaction, amount: Decimal) -> Result<()> {
        let tid = transaction
            .tid()
            .ok_or_else(|| CieloError::logic("cancel requires a transaction id"))?
            .to_string();

        let payload = payload::cancel(&self.merchant, &tid, amount)?;
        info!(tid = %tid, amount = %amount, "requesting cancellation");
        self.roundtrip(transaction, &payload).await
    }

    /// Reloads status and flags from the gateway's current record.
    ///
    /// Works on any record with a transaction id, including one created
    /// with [`Transaction::with_tid`] for a transaction driven elsewhere,
    /// and is the way to resolve a transaction after a transport timeout
    /// or a redirect-flow authentication.
    pub async fn refresh(&self, transaction: &mut Transaction) -> Result<()> {
        let tid = transaction
            .tid()
            .ok_or_else(|| CieloError::logic("refresh requires a transaction id"))?
            .to_string();

        let payload = payload::query(&self.merchant, &tid)?;
        info!(tid = %tid, "querying transaction status");
        self.roundtrip(transaction, &payload).await
    }

    async fn roundtrip(&self, transaction: &mut Transaction, payload: &str) -> Result<()> {
        let raw = self
            .transport
            .send(self.environment.endpoint(), payload)
            .await?;
        let decoded = decoder::decode(&raw)?;
        transaction.apply_response(decoded, &raw)
    }
}
