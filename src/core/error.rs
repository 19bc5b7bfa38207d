/// Crate-wide Result type
pub type Result<T> = std::result::Result<T, CieloError>;

/// Main error type for gateway interactions
///
/// A declined authorization is not an error: it is a normal response with
/// `authorized == false`. Everything here is either a local misuse caught
/// before the network, a transport failure, or an outright rejection
/// reported by the gateway.
#[derive(thiserror::Error, Debug)]
pub enum CieloError {
    /// Invalid request parameters, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation invoked out of order (e.g. capture before authorization)
    #[error("Logic error: {0}")]
    Logic(String),

    /// Timeout or connection failure; the final transaction state is
    /// unknown and the caller should refresh rather than retry blindly
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body could not be parsed into the expected tree
    #[error("Malformed gateway response (HTTP {http_status}): {reason}")]
    ResponseFormat {
        http_status: u16,
        reason: String,
        body: String,
    },

    /// Error envelope or business-rule rejection reported by the gateway
    #[error("Gateway error {code}: {message}")]
    Gateway {
        code: String,
        message: String,
        raw: Option<String>,
    },

    /// Internal client errors
    #[error("Internal error: {0}")]
    Internal(String),
}

// Helper constructors for common error scenarios
impl CieloError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CieloError::Validation(msg.into())
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        CieloError::Logic(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        CieloError::Transport(msg.into())
    }

    pub fn response_format(
        http_status: u16,
        reason: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        CieloError::ResponseFormat {
            http_status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        CieloError::Internal(msg.into())
    }

    /// The gateway's 3-digit error code, when this is a gateway rejection
    pub fn gateway_code(&self) -> Option<&str> {
        match self {
            CieloError::Gateway { code, .. } => Some(code),
            _ => None,
        }
    }
}
