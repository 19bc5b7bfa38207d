use serde_json::Value;

use crate::modules::gateway::services::decoder;

/// A stored-card token issued by the gateway, replacing PAN/CVV in later
/// authorizations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardToken {
    /// Opaque token (`codigo-token`)
    pub token: String,
    /// Gateway token status, when reported
    pub status: Option<String>,
    /// Truncated card number for display (`numero-cartao-truncado`)
    pub truncated_pan: Option<String>,
}

impl CardToken {
    /// Reads a token out of a decoded `dados-token` element
    pub(crate) fn from_tree(tree: &Value) -> Option<Self> {
        let token = decoder::text_at(tree, &["codigo-token"])?;
        Some(Self {
            token: token.to_string(),
            status: decoder::text_at(tree, &["status"]).map(str::to_string),
            truncated_pan: decoder::text_at(tree, &["numero-cartao-truncado"]).map(str::to_string),
        })
    }
}
