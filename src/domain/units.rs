//! Token Amount Scaling
//!
//! Converts human-readable token amounts (e.g. `5` QuizToken) into
//! the integer base units the contracts expect (`5 * 10^18`).
//! Uses `rust_decimal` so prices written in config never pass
//! through floating point.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error;

/// Largest decimals value accepted for a fungible token.
pub const MAX_TOKEN_DECIMALS: u32 = 36;

/// Errors raised when a configured amount cannot be scaled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount must be positive, got {0}")]
    NotPositive(Decimal),

    #[error("amount {amount} has more fractional digits than the token's {decimals} decimals")]
    TooPrecise { amount: Decimal, decimals: u32 },

    #[error("token decimals {0} exceed the supported maximum of 36")]
    TooManyDecimals(u32),
}

/// Scale `amount` by `10^decimals` into an exact integer.
///
/// Fails instead of rounding when the amount carries more fractional
/// digits than the token supports.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, AmountError> {
    if decimals > MAX_TOKEN_DECIMALS {
        return Err(AmountError::TooManyDecimals(decimals));
    }
    if amount <= Decimal::ZERO {
        return Err(AmountError::NotPositive(amount));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(AmountError::TooPrecise { amount, decimals });
    }

    let mantissa = U256::from(normalized.mantissa().unsigned_abs());
    let factor = U256::from(10u8).pow(U256::from(decimals - scale));
    Ok(mantissa * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_five_tokens_at_eighteen_decimals() {
        let expected = U256::from(5u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(to_base_units(dec!(5), 18).unwrap(), expected);
    }

    #[test]
    fn test_fractional_amount() {
        assert_eq!(to_base_units(dec!(1.5), 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(to_base_units(dec!(2.50), 2).unwrap(), U256::from(250u64));
    }

    #[test]
    fn test_zero_decimals() {
        assert_eq!(to_base_units(dec!(42), 0).unwrap(), U256::from(42u64));
    }

    #[test]
    fn test_rejects_excess_precision() {
        assert_eq!(
            to_base_units(dec!(0.001), 2),
            Err(AmountError::TooPrecise {
                amount: dec!(0.001),
                decimals: 2
            })
        );
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(matches!(
            to_base_units(Decimal::ZERO, 18),
            Err(AmountError::NotPositive(_))
        ));
        assert!(matches!(
            to_base_units(dec!(-1), 18),
            Err(AmountError::NotPositive(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_decimals() {
        assert_eq!(
            to_base_units(dec!(1), 40),
            Err(AmountError::TooManyDecimals(40))
        );
    }
}
