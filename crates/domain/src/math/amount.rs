use primitive_types::U256;
use rust_decimal::Decimal;

/// Returns `floor(raw * fraction)` using the decimal's mantissa and scale.
///
/// Fractions at or below zero yield zero; fractions above one are clamped to one.
pub fn scale_by_fraction(raw: U256, fraction: Decimal) -> U256 {
    if fraction <= Decimal::ZERO {
        return U256::zero();
    }
    if fraction >= Decimal::ONE {
        return raw;
    }
    let fraction = fraction.normalize();
    // (0, 1) so the mantissa is positive and fits in u128.
    let mantissa = U256::from(fraction.mantissa() as u128);
    let divisor = U256::exp10(fraction.scale() as usize);
    match raw.checked_mul(mantissa) {
        Some(product) => product / divisor,
        None => (raw / divisor) * mantissa,
    }
}
