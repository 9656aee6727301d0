use rust_decimal::{Decimal, RoundingStrategy};

use super::validation::{AMOUNT_PLACES, PERCENT_PLACES, PRICE_PLACES};
use crate::error::PortfolioError;

// Arrondi commercial (0.005 -> 0.01), aux décimales des colonnes

pub fn round_amount(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(AMOUNT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

fn out_of_range(what: &str) -> PortfolioError {
    PortfolioError::InvalidInput(format!("{} is out of range", what))
}

/// `a × b` sans panique en cas de dépassement
pub fn product(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, PortfolioError> {
    a.checked_mul(b).ok_or_else(|| out_of_range(what))
}

/// `a / b`; `b` nul ou résultat trop grand -> InvalidInput
pub fn quotient(a: Decimal, b: Decimal, what: &str) -> Result<Decimal, PortfolioError> {
    a.checked_div(b).ok_or_else(|| out_of_range(what))
}

/// `part / base * 100`, rounded to 4 places. Zero when `base` is zero.
pub fn percent_of(part: Decimal, base: Decimal) -> Result<Decimal, PortfolioError> {
    if base.is_zero() {
        return Ok(Decimal::ZERO);
    }
    let ratio = quotient(part, base, "percentage")?;
    Ok(round_percent(product(ratio, Decimal::ONE_HUNDRED, "percentage")?))
}
