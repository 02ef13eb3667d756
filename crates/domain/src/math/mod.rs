/// Raw amount scaling.
pub mod amount;
/// Tick and price conversions.
pub mod price_tick;
