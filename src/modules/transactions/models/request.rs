use chrono::{Datelike, Local};
use rust_decimal::Decimal;

use crate::core::error::{CieloError, Result};
use crate::core::money;

/// Maximum number of installments the gateway accepts
pub const MAX_INSTALLMENTS: u32 = 12;

/// Card brands accepted by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardBrand {
    Visa,
    Mastercard,
    Diners,
    Discover,
    Elo,
    Amex,
}

impl CardBrand {
    /// Wire value for the `bandeira` field
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "visa",
            CardBrand::Mastercard => "mastercard",
            CardBrand::Diners => "diners",
            CardBrand::Discover => "discover",
            CardBrand::Elo => "elo",
            CardBrand::Amex => "amex",
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CardBrand {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "visa" => Ok(CardBrand::Visa),
            "mastercard" => Ok(CardBrand::Mastercard),
            "diners" => Ok(CardBrand::Diners),
            "discover" => Ok(CardBrand::Discover),
            "elo" => Ok(CardBrand::Elo),
            "amex" => Ok(CardBrand::Amex),
            _ => Err(format!("Invalid card brand: {}", s)),
        }
    }
}

/// Payment modality, the `produto` field of `forma-pagamento`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Single payment ("à vista")
    Cash,
    /// Installments financed by the merchant ("parcelado estabelecimento")
    InstallmentByMerchant,
    /// Installments financed by the gateway ("parcelado administradora")
    InstallmentByGateway,
}

impl TransactionKind {
    pub fn wire_code(&self) -> &'static str {
        match self {
            TransactionKind::Cash => "1",
            TransactionKind::InstallmentByMerchant => "2",
            TransactionKind::InstallmentByGateway => "3",
        }
    }
}

/// Raw card data for one authorization or tokenization attempt.
///
/// Never stored by this crate; it exists only while the outbound payload
/// is being rendered.
#[derive(Debug, Clone)]
pub struct RawCardData {
    number: String,
    holder_name: String,
    security_code: String,
    exp_month: u32,
    exp_year: u32,
}

impl RawCardData {
    /// Validates the card data and normalizes a 2-digit expiration year
    /// to 20xx. Cards expiring in the current month are still valid.
    pub fn new(
        number: impl Into<String>,
        holder_name: impl Into<String>,
        security_code: impl Into<String>,
        exp_month: u32,
        exp_year: u32,
    ) -> Result<Self> {
        if !(1..=12).contains(&exp_month) {
            return Err(CieloError::validation(format!(
                "expiration month must be between 1 and 12, got {}",
                exp_month
            )));
        }

        let exp_year = normalize_year(exp_year)?;

        let today = Local::now().date_naive();
        if (exp_year, exp_month) < (today.year() as u32, today.month()) {
            return Err(CieloError::validation(format!(
                "card expired on {:02}/{}",
                exp_month, exp_year
            )));
        }

        Ok(Self {
            number: number.into(),
            holder_name: holder_name.into(),
            security_code: security_code.into(),
            exp_month,
            exp_year,
        })
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    pub fn security_code(&self) -> &str {
        &self.security_code
    }

    pub fn exp_month(&self) -> u32 {
        self.exp_month
    }

    /// Always 4 digits after construction
    pub fn exp_year(&self) -> u32 {
        self.exp_year
    }

    /// Expiration in the gateway's `AAAAMM` wire form
    pub fn expiration(&self) -> String {
        format!("{:04}{:02}", self.exp_year, self.exp_month)
    }
}

fn normalize_year(year: u32) -> Result<u32> {
    let normalized = if (10..=99).contains(&year) {
        year + 2000
    } else {
        year
    };
    if !(1000..=9999).contains(&normalized) {
        return Err(CieloError::validation(format!(
            "expiration year must have 2 or 4 digits, got {}",
            year
        )));
    }
    Ok(normalized)
}

/// Opaque stored-card token issued by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenReference {
    pub token: String,
}

impl TokenReference {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

/// How the cardholder is identified in an authorization
#[derive(Debug, Clone)]
pub enum PaymentSource {
    RawCard(RawCardData),
    Token(TokenReference),
}

/// Order data sent in `dados-pedido`
#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub total: Decimal,
    pub description: Option<String>,
}

impl Order {
    pub fn new(id: impl Into<String>, total: Decimal) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CieloError::validation("order id cannot be empty"));
        }
        if total <= Decimal::ZERO {
            return Err(CieloError::validation(format!(
                "order total must be positive, got {}",
                total
            )));
        }
        // fails early on amounts the wire format cannot carry
        money::to_cents(total)?;

        Ok(Self {
            id,
            total,
            description: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Behavioral payment parameters for one authorization
#[derive(Debug, Clone)]
pub struct PaymentTerms {
    pub brand: CardBrand,
    pub kind: TransactionKind,
    pub installments: u32,
    /// Capture automatically once authorized
    pub capture: bool,
    /// Ask the gateway to also issue a reusable card token
    pub tokenize: bool,
    /// Where the cardholder returns after out-of-band authentication.
    /// Its presence selects the authenticate-first (redirect) flow.
    pub return_url: Option<String>,
}

impl PaymentTerms {
    /// Single cash payment with the given brand
    pub fn cash(brand: CardBrand) -> Self {
        Self {
            brand,
            kind: TransactionKind::Cash,
            installments: 1,
            capture: false,
            tokenize: false,
            return_url: None,
        }
    }

    /// Installment plan with the given modality
    pub fn installments(brand: CardBrand, kind: TransactionKind, installments: u32) -> Self {
        Self {
            brand,
            kind,
            installments,
            capture: false,
            tokenize: false,
            return_url: None,
        }
    }

    pub fn with_capture(mut self) -> Self {
        self.capture = true;
        self
    }

    pub fn with_tokenization(mut self) -> Self {
        self.tokenize = true;
        self
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = Some(url.into());
        self
    }
}

/// The validated parameter set for one authorization attempt.
///
/// Construction is the validation boundary: a `TransactionRequest` that
/// exists is renderable, so no payload can silently miss a required
/// field or carry an inconsistent installment plan.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub order: Order,
    pub terms: PaymentTerms,
    pub source: PaymentSource,
}

impl TransactionRequest {
    pub fn new(order: Order, terms: PaymentTerms, source: PaymentSource) -> Result<Self> {
        if !(1..=MAX_INSTALLMENTS).contains(&terms.installments) {
            return Err(CieloError::validation(format!(
                "installments must be between 1 and {}, got {}",
                MAX_INSTALLMENTS, terms.installments
            )));
        }

        let cash = terms.kind == TransactionKind::Cash;
        if (terms.installments == 1) != cash {
            return Err(CieloError::validation(
                "a single installment requires the cash modality, and installment plans require more than one",
            ));
        }

        Ok(Self {
            order,
            terms,
            source,
        })
    }
}
