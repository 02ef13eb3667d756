use crate::errors::DomainError;
use crate::math::price_tick::{ceil_to_spacing, check_tick, floor_to_spacing};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the current price a leg sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Range ending at the current tick.
    Lower,
    /// Range starting at the current tick.
    Upper,
}

/// A `[tick_lower, tick_upper]` interval with `tick_lower < tick_upper`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickRange {
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl TickRange {
    /// Creates a new range, rejecting `tick_lower >= tick_upper`.
    pub fn new(tick_lower: i32, tick_upper: i32) -> Result<Self, DomainError> {
        if tick_lower >= tick_upper {
            return Err(DomainError::InvalidRange {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        Ok(Self {
            tick_lower,
            tick_upper,
        })
    }

    /// Builds one leg of the two-sided layout around `current_tick`.
    ///
    /// The lower leg is `[current - width, current]`, the upper leg is
    /// `[current, current + width]`. Bounds are snapped onto `tick_spacing`
    /// toward the current tick; if snapping collapses the leg, its outer bound
    /// is pushed out by one spacing. `width` below one spacing is raised to it.
    pub fn for_side(
        side: Side,
        current_tick: i32,
        width: i32,
        tick_spacing: i32,
    ) -> Result<Self, DomainError> {
        if tick_spacing <= 0 {
            return Err(DomainError::InvalidTickSpacing(tick_spacing));
        }
        let spacing = i64::from(tick_spacing);
        let width = i64::from(width).max(spacing);
        let current = i64::from(current_tick);

        let (lower, upper) = match side {
            Side::Lower => {
                let upper = floor_to_spacing(current, tick_spacing);
                let mut lower = ceil_to_spacing(current - width, tick_spacing);
                if upper - lower < spacing {
                    lower = upper - spacing;
                }
                (lower, upper)
            }
            Side::Upper => {
                let lower = ceil_to_spacing(current, tick_spacing);
                let mut upper = floor_to_spacing(current + width, tick_spacing);
                if upper - lower < spacing {
                    upper = lower + spacing;
                }
                (lower, upper)
            }
        };

        Self::new(check_tick(lower)?, check_tick(upper)?)
    }

    /// Returns the width in ticks.
    pub fn width(&self) -> i32 {
        self.tick_upper - self.tick_lower
    }

    /// Boundary-inclusive containment.
    pub fn contains(&self, tick: i32) -> bool {
        tick >= self.tick_lower && tick <= self.tick_upper
    }

    /// True when `self` ends at or below the start of `other`.
    pub fn is_below(&self, other: &TickRange) -> bool {
        self.tick_upper <= other.tick_lower
    }
}

impl fmt::Display for TickRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.tick_lower, self.tick_upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted() {
        assert!(TickRange::new(10, 10).is_err());
        assert!(TickRange::new(20, 10).is_err());
        assert_eq!(TickRange::new(10, 20).unwrap().width(), 10);
    }

    #[test]
    fn test_legs_straddle_current_tick() {
        let lower = TickRange::for_side(Side::Lower, 1000, 500, 1).unwrap();
        let upper = TickRange::for_side(Side::Upper, 1000, 500, 1).unwrap();
        assert_eq!(lower, TickRange::new(500, 1000).unwrap());
        assert_eq!(upper, TickRange::new(1000, 1500).unwrap());
        assert!(lower.is_below(&upper));
    }

    #[test]
    fn test_legs_snap_toward_current_tick() {
        let lower = TickRange::for_side(Side::Lower, 125, 200, 60).unwrap();
        let upper = TickRange::for_side(Side::Upper, 125, 200, 60).unwrap();
        assert_eq!(lower, TickRange::new(-60, 120).unwrap());
        assert_eq!(upper, TickRange::new(180, 300).unwrap());
        assert!(lower.is_below(&upper));
    }

    #[test]
    fn test_collapsed_leg_is_pushed_out() {
        // 125 - 60 = 65 snaps up to 120 == upper, so the outer bound moves down.
        let lower = TickRange::for_side(Side::Lower, 125, 60, 60).unwrap();
        assert_eq!(lower, TickRange::new(60, 120).unwrap());
        let upper = TickRange::for_side(Side::Upper, 125, 60, 60).unwrap();
        assert_eq!(upper, TickRange::new(180, 240).unwrap());
    }

    #[test]
    fn test_non_positive_width_is_raised_to_spacing() {
        let lower = TickRange::for_side(Side::Lower, 100, -40, 10).unwrap();
        assert_eq!(lower, TickRange::new(90, 100).unwrap());
    }

    #[test]
    fn test_invalid_spacing() {
        assert_eq!(
            TickRange::for_side(Side::Upper, 0, 10, 0),
            Err(DomainError::InvalidTickSpacing(0))
        );
    }

    #[test]
    fn test_out_of_bounds() {
        assert!(TickRange::for_side(Side::Upper, 887_000, 500, 1).is_err());
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = TickRange::new(100, 200).unwrap();
        assert!(r.contains(100));
        assert!(r.contains(200));
        assert!(!r.contains(99));
        assert!(!r.contains(201));
    }
}
