use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::MONEY_DECIMAL_PRECISION;

/// Rounds a money amount to cents, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        MONEY_DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Clamps `value` into `[min, max]`. A negative range collapses to `min`.
pub fn clamp_amount(value: Decimal, min: Decimal, max: Decimal) -> Decimal {
    if max <= min {
        return min;
    }
    value.max(min).min(max)
}
