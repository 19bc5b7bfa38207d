use rust_decimal::Decimal;

use crate::core::error::{CieloError, Result};

/// Maximum fraction digits the gateway accepts for monetary values
const MAX_SCALE: u32 = 2;

/// Encodes a decimal amount as the gateway's integer-cents wire string
/// with no separators: `1.00` becomes `"100"`, `0.5` becomes `"50"`.
///
/// The gateway compares this field against its own ledger, so the
/// conversion is exact decimal arithmetic. Amounts that are negative or
/// carry more than two fraction digits cannot be represented and fail.
pub fn to_cents(amount: Decimal) -> Result<String> {
    if amount.is_sign_negative() {
        return Err(CieloError::validation(format!(
            "amount cannot be negative, got {}",
            amount
        )));
    }

    let normalized = amount.normalize();
    if normalized.scale() > MAX_SCALE {
        return Err(CieloError::validation(format!(
            "amount must have at most {} decimal places, got {}",
            MAX_SCALE, amount
        )));
    }

    let cents = (normalized * Decimal::ONE_HUNDRED).normalize();
    Ok(cents.to_string())
}
