//! Gateway endpoints and merchant credentials.
//!
//! Credentials are always supplied by the caller; the library never reads
//! them from the process environment or embeds them in code.

/// Target gateway environment, selecting the webservice endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Sandbox,
}

impl Environment {
    /// The webservice URL all operations are posted to
    pub fn endpoint(&self) -> &'static str {
        match self {
            Environment::Production => "https://ecommerce.cbmp.com.br/servicos/ecommwsec.do",
            Environment::Sandbox => "https://qasecommerce.cielo.com.br/servicos/ecommwsec.do",
        }
    }
}

/// Merchant credentials issued by the gateway
#[derive(Debug, Clone)]
pub struct Merchant {
    /// Store affiliation number (`dados-ec.numero`)
    pub affiliation_id: String,
    /// Store API key (`dados-ec.chave`)
    pub api_key: String,
}

impl Merchant {
    pub fn new(affiliation_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            affiliation_id: affiliation_id.into(),
            api_key: api_key.into(),
        }
    }
}
