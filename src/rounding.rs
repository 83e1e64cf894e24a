//! Fixed-point rounding between the generator's f64 world and Decimal.
//!
//! Displayed telemetry is rounded half away from zero to a fixed number of
//! decimal places, the same way the dashboard formats numbers.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// Convert f64 to Decimal (lossy but sufficient for simulation).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Round a Decimal to `dp` places, half away from zero.
pub fn round_decimal(d: Decimal, dp: u32) -> Decimal {
    d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round an f64 to `dp` places, half away from zero.
pub fn round_dp(v: f64, dp: u32) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    from_decimal(round_decimal(to_decimal(v), dp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_dp(1.25, 1), 1.3);
        assert_eq!(round_dp(1.13, 2), 1.13);
        assert_eq!(round_dp(-0.05, 1), -0.1);
        assert_eq!(round_dp(25.0966, 1), 25.1);
    }

    #[test]
    fn non_finite_collapses_to_zero() {
        assert_eq!(round_dp(f64::NAN, 2), 0.0);
        assert_eq!(round_dp(f64::INFINITY, 2), 0.0);
    }

    #[test]
    fn decimal_rounding_is_exact() {
        assert_eq!(round_decimal(dec!(43.27) * dec!(0.58), 1), dec!(25.1));
    }
}
