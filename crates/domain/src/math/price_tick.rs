use crate::errors::DomainError;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Lowest tick supported by Uniswap-V3-style pools.
pub const MIN_TICK: i32 = -887_272;
/// Highest tick supported by Uniswap-V3-style pools.
pub const MAX_TICK: i32 = 887_272;

const TICK_BASE: f64 = 1.0001;

/// Returns the price of token0 in token1 at the given tick.
/// P = 1.0001 ^ tick
pub fn tick_to_price(tick: i32) -> Result<Decimal, DomainError> {
    let price = TICK_BASE.powi(tick);
    Decimal::from_f64(price).ok_or(DomainError::PriceOverflow(tick))
}

/// Validates that a tick lies in `[MIN_TICK, MAX_TICK]`.
pub fn check_tick(tick: i64) -> Result<i32, DomainError> {
    if tick < i64::from(MIN_TICK) || tick > i64::from(MAX_TICK) {
        return Err(DomainError::TickOutOfBounds(tick));
    }
    Ok(tick as i32)
}

/// Largest multiple of `spacing` not above `tick`.
pub fn floor_to_spacing(tick: i64, spacing: i32) -> i64 {
    let s = i64::from(spacing);
    tick.div_euclid(s) * s
}

/// Smallest multiple of `spacing` not below `tick`.
pub fn ceil_to_spacing(tick: i64, spacing: i32) -> i64 {
    -floor_to_spacing(-tick, spacing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_to_price() {
        assert_eq!(tick_to_price(0).unwrap(), Decimal::ONE);

        // 1.0001^100 ~= 1.010049
        let p100 = tick_to_price(100).unwrap().to_f64().unwrap();
        assert!((p100 - 1.01004966).abs() < 0.000001);
    }

    #[test]
    fn test_spacing_rounding() {
        assert_eq!(floor_to_spacing(125, 60), 120);
        assert_eq!(ceil_to_spacing(125, 60), 180);
        assert_eq!(floor_to_spacing(-125, 60), -180);
        assert_eq!(ceil_to_spacing(-125, 60), -120);
        assert_eq!(floor_to_spacing(120, 60), 120);
        assert_eq!(ceil_to_spacing(120, 60), 120);
    }

    #[test]
    fn test_check_tick_bounds() {
        assert_eq!(check_tick(887_272), Ok(MAX_TICK));
        assert!(check_tick(887_273).is_err());
        assert!(check_tick(-887_273).is_err());
    }
}
