use serde_json::Value;

use crate::core::error::{CieloError, Result};
use crate::modules::gateway::services::decoder::{self, DecodedResponse};
use crate::modules::gateway::services::transport::RawResponse;
use crate::modules::tokens::models::CardToken;

/// Gateway status vocabulary for a transaction.
///
/// Codes 4 and 6 are the authorized outcomes, 9 is terminal cancellation,
/// 0/1/2/10/12 are in-flight states observable during the redirect flow,
/// and everything else is a terminal refusal whose reason travels in the
/// `autorizacao` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// 0 - created, waiting for cardholder authentication
    Created,
    /// 1 - being processed
    InProgress,
    /// 2 - cardholder authenticated
    Authenticated,
    /// 3 - cardholder failed authentication
    NotAuthenticated,
    /// 4 - authorized, waiting for capture
    Authorized,
    /// 5 - authorization refused
    NotAuthorized,
    /// 6 - captured
    Captured,
    /// 9 - cancelled
    Cancelled,
    /// 10 - cardholder authentication in progress
    Authenticating,
    /// 12 - cancellation in progress
    Cancelling,
    /// Any other code the gateway may introduce
    Other(u8),
}

impl TransactionStatus {
    /// Numeric wire code
    pub fn code(&self) -> u8 {
        match self {
            TransactionStatus::Created => 0,
            TransactionStatus::InProgress => 1,
            TransactionStatus::Authenticated => 2,
            TransactionStatus::NotAuthenticated => 3,
            TransactionStatus::Authorized => 4,
            TransactionStatus::NotAuthorized => 5,
            TransactionStatus::Captured => 6,
            TransactionStatus::Cancelled => 9,
            TransactionStatus::Authenticating => 10,
            TransactionStatus::Cancelling => 12,
            TransactionStatus::Other(code) => *code,
        }
    }

    /// The gateway's Portuguese label for this status
    pub fn description(&self) -> &'static str {
        match self {
            TransactionStatus::Created => "Criada",
            TransactionStatus::InProgress => "Em andamento",
            TransactionStatus::Authenticated => "Autenticada",
            TransactionStatus::NotAuthenticated => "Não autenticada",
            TransactionStatus::Authorized => "Autorizada",
            TransactionStatus::NotAuthorized => "Não autorizada",
            TransactionStatus::Captured => "Capturada",
            TransactionStatus::Cancelled => "Cancelada",
            TransactionStatus::Authenticating => "Em autenticação",
            TransactionStatus::Cancelling => "Em cancelamento",
            TransactionStatus::Other(_) => "Desconhecido",
        }
    }

    /// Authorized outcomes: plain authorization or capture
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Authorized | TransactionStatus::Captured
        )
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, TransactionStatus::Captured)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransactionStatus::Cancelled)
    }

    /// Neither success nor failure yet; a later refresh resolves it
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Created
                | TransactionStatus::InProgress
                | TransactionStatus::Authenticated
                | TransactionStatus::Authenticating
                | TransactionStatus::Cancelling
        )
    }

    /// Terminal refusal
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            TransactionStatus::NotAuthenticated
                | TransactionStatus::NotAuthorized
                | TransactionStatus::Other(_)
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "0" => Ok(TransactionStatus::Created),
            "1" => Ok(TransactionStatus::InProgress),
            "2" => Ok(TransactionStatus::Authenticated),
            "3" => Ok(TransactionStatus::NotAuthenticated),
            "4" => Ok(TransactionStatus::Authorized),
            "5" => Ok(TransactionStatus::NotAuthorized),
            "6" => Ok(TransactionStatus::Captured),
            "9" => Ok(TransactionStatus::Cancelled),
            "10" => Ok(TransactionStatus::Authenticating),
            "12" => Ok(TransactionStatus::Cancelling),
            other => other
                .parse::<u8>()
                .map(TransactionStatus::Other)
                .map_err(|_| format!("Invalid transaction status: {}", other)),
        }
    }
}

/// Authorization refusal detail from the `autorizacao` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclineReason {
    pub code: String,
    pub message: String,
}

/// One entry of the gateway's cancellation history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cancellation {
    pub code: String,
    pub date_time: String,
    pub message: String,
    /// Cancelled amount in integer cents, as sent on the wire
    pub amount_cents: String,
}

/// The mutable record of one gateway-side transaction.
///
/// Created empty and populated by an authorization, or created from a
/// known transaction id to follow up on a transaction driven elsewhere.
/// The `authorized`/`captured`/`cancelled` flags are always re-derived
/// from the latest status the gateway reported.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    tid: Option<String>,
    pan: Option<String>,
    status: Option<TransactionStatus>,
    authorized: bool,
    captured: bool,
    cancelled: bool,
    response: Value,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a transaction known only by its gateway id, e.g. one
    /// authorized by another process
    pub fn with_tid(tid: impl Into<String>) -> Self {
        Self {
            tid: Some(tid.into()),
            ..Self::default()
        }
    }

    /// Gateway-assigned transaction id, absent until the first
    /// successful call
    pub fn tid(&self) -> Option<&str> {
        self.tid.as_deref()
    }

    /// Masked card number echoed by the gateway
    pub fn pan(&self) -> Option<&str> {
        self.pan.as_deref()
    }

    pub fn status(&self) -> Option<TransactionStatus> {
        self.status
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// The full decoded response tree of the last call, for fields this
    /// crate does not model
    pub fn response(&self) -> &Value {
        &self.response
    }

    /// Where the cardholder must authenticate when the transaction was
    /// created in the redirect flow (status 0)
    pub fn authentication_url(&self) -> Option<&str> {
        decoder::text_at(&self.response, &["url-autenticacao"])
    }

    /// Refusal reason, present only for declined outcomes
    pub fn decline(&self) -> Option<DeclineReason> {
        if !self.status?.is_declined() {
            return None;
        }
        let code = decoder::text_at(&self.response, &["autorizacao", "codigo"])?;
        let message =
            decoder::text_at(&self.response, &["autorizacao", "mensagem"]).unwrap_or_default();
        Some(DeclineReason {
            code: code.to_string(),
            message: message.to_string(),
        })
    }

    /// The card token issued when the authorization asked for one
    pub fn issued_token(&self) -> Option<CardToken> {
        let tree = self.response.get("token")?.get("dados-token")?;
        CardToken::from_tree(tree)
    }

    /// Cancellation history reported by the gateway, oldest first
    pub fn cancellations(&self) -> Vec<Cancellation> {
        match self
            .response
            .get("cancelamentos")
            .and_then(|node| node.get("cancelamento"))
        {
            Some(Value::Array(entries)) => entries.iter().filter_map(parse_cancellation).collect(),
            Some(entry) => parse_cancellation(entry).into_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Absorbs a decoded `transacao` reply, advancing status and flags.
    ///
    /// Nothing is touched unless the reply carries a valid status, so a
    /// malformed response leaves the record exactly as it was.
    pub(crate) fn apply_response(
        &mut self,
        decoded: DecodedResponse,
        raw: &RawResponse,
    ) -> Result<()> {
        let status_text = decoder::text_at(&decoded.tree, &["status"]).ok_or_else(|| {
            CieloError::response_format(raw.http_status, "transacao without status", raw.body.clone())
        })?;
        let status: TransactionStatus = status_text.parse().map_err(|reason: String| {
            CieloError::response_format(raw.http_status, reason, raw.body.clone())
        })?;

        let tid = decoder::text_at(&decoded.tree, &["tid"]).map(str::to_string);
        if status.is_authorized() && tid.is_none() && self.tid.is_none() {
            return Err(CieloError::response_format(
                raw.http_status,
                "authorized transacao without tid",
                raw.body.clone(),
            ));
        }

        if let Some(tid) = tid {
            self.tid = Some(tid);
        }
        if let Some(pan) = decoder::text_at(&decoded.tree, &["pan"]) {
            self.pan = Some(pan.to_string());
        }

        self.status = Some(status);
        self.authorized = status.is_authorized();
        self.captured = status.is_captured();
        self.cancelled = status.is_cancelled();
        self.response = decoded.tree;
        Ok(())
    }
}

fn parse_cancellation(entry: &Value) -> Option<Cancellation> {
    Some(Cancellation {
        code: decoder::text_at(entry, &["codigo"])?.to_string(),
        date_time: decoder::text_at(entry, &["data-hora"])
            .unwrap_or_default()
            .to_string(),
        message: decoder::text_at(entry, &["mensagem"])
            .unwrap_or_default()
            .to_string(),
        amount_cents: decoder::text_at(entry, &["valor"])
            .unwrap_or_default()
            .to_string(),
    })
}
