//! Strongly-typed numeric primitives for boom layout (zero-cost newtypes).
//!
//! Positions along the boom are measured in nozzle-equivalents: nozzle 1 sits
//! at 1.0, the gap between nozzles 3 and 4 at 3.5. Physical lengths only
//! appear once a spacing is applied.

use std::fmt;

use glam::{DVec2, dvec2};

/// Error type for invalid numeric values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericError {
    /// Value is NaN
    NaN,
    /// Value is infinite
    Infinite,
    /// Value is zero when non-zero required
    Zero,
    /// Value is negative when positive required
    Negative,
}

impl fmt::Display for NumericError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericError::NaN => write!(f, "value is NaN"),
            NumericError::Infinite => write!(f, "value is infinite"),
            NumericError::Zero => write!(f, "value is zero"),
            NumericError::Negative => write!(f, "value is negative"),
        }
    }
}

impl std::error::Error for NumericError {}

/// Position along the boom in nozzle-equivalent units
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct NozzlePos(pub f64);

impl NozzlePos {
    /// Position of a whole nozzle index.
    #[inline]
    pub fn at(nozzle: u32) -> NozzlePos {
        NozzlePos(f64::from(nozzle))
    }

    /// Get the raw value (use sparingly, prefer typed operations)
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Midpoint between two positions
    #[inline]
    pub fn midpoint(self, other: NozzlePos) -> NozzlePos {
        NozzlePos((self.0 + other.0) / 2.0)
    }

    /// Unsigned distance in nozzle pitches
    #[inline]
    pub fn distance(self, other: NozzlePos) -> f64 {
        (self.0 - other.0).abs()
    }

    /// Shift by a whole number of nozzle pitches
    #[inline]
    pub fn shifted(self, pitches: i32) -> NozzlePos {
        NozzlePos(self.0 + f64::from(pitches))
    }

    /// True when `self` lies strictly between `a` and `b` (in either order).
    pub fn strictly_between(self, a: NozzlePos, b: NozzlePos) -> bool {
        let (lo, hi) = if a.0 <= b.0 { (a.0, b.0) } else { (b.0, a.0) };
        self.0 > lo && self.0 < hi
    }

    /// Total ordering for sorting; positions are always finite.
    pub fn total_cmp(&self, other: &NozzlePos) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Shortest decimal form: `18`, `6.5`, `-2.5`.
///
/// This is the text used inside edge identifiers, so it must stay stable.
impl fmt::Display for NozzlePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            // avoid "-0"
            return write!(f, "0");
        }
        write!(f, "{}", self.0)
    }
}

/// Nozzle spacing in inches
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Inches(pub f64);

impl Inches {
    /// Create a positive spacing with validation
    pub fn try_positive(val: f64) -> Result<Inches, NumericError> {
        if val.is_nan() {
            Err(NumericError::NaN)
        } else if val.is_infinite() {
            Err(NumericError::Infinite)
        } else if val == 0.0 {
            Err(NumericError::Zero)
        } else if val < 0.0 {
            Err(NumericError::Negative)
        } else {
            Ok(Inches(val))
        }
    }

    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Physical length of `pitches` nozzle gaps at this spacing.
    #[inline]
    pub fn span_feet(self, pitches: f64) -> Feet {
        Feet(pitches * self.0 / 12.0)
    }
}

impl fmt::Display for Inches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\"", self.0)
    }
}

/// Unrounded physical length in feet
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[repr(transparent)]
pub struct Feet(pub f64);

impl Feet {
    #[inline]
    pub fn raw(self) -> f64 {
        self.0
    }

    /// Round up to the next multiple of `step` feet, never below one step.
    pub fn round_up_to(self, step: u32) -> u32 {
        let step_f = f64::from(step);
        let steps = (self.0 / step_f).ceil().max(1.0);
        // lengths are bounded by a 200-nozzle boom, well inside u32
        (steps as u32) * step
    }
}

impl fmt::Display for Feet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}'", self.0)
    }
}

/// Convert nozzle positions ↔ drawing pixels.
///
/// Nozzle `n` is drawn centred at `offset_x + (n - 0.5) * nozzle_px`, so the
/// left boom tip sits at `offset_x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawingScale {
    pub nozzle_px: f64,
    pub offset_x: f64,
    /// Y of the boom rail
    pub boom_y: f64,
    /// Y of the highest fold tier
    pub max_y: f64,
}

impl Default for DrawingScale {
    fn default() -> Self {
        DrawingScale { nozzle_px: 26.0, offset_x: 30.0, boom_y: 120.0, max_y: 36.0 }
    }
}

impl DrawingScale {
    /// Pixel x of a nozzle position.
    pub fn x(&self, pos: NozzlePos) -> f64 {
        self.offset_x + (pos.0 - 0.5) * self.nozzle_px
    }

    /// Y for a fold tier height (1.0 = top, 0.0 = rail).
    pub fn tier_y(&self, fraction: f64) -> f64 {
        self.max_y + (self.boom_y - self.max_y) * (1.0 - fraction)
    }

    pub fn point(&self, pos: NozzlePos, tier: f64) -> DVec2 {
        dvec2(self.x(pos), self.tier_y(tier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nozzle_pos_display_is_shortest_form() {
        assert_eq!(NozzlePos(18.0).to_string(), "18");
        assert_eq!(NozzlePos(6.5).to_string(), "6.5");
        assert_eq!(NozzlePos(-0.0).to_string(), "0");
        assert_eq!(NozzlePos(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn nozzle_pos_strictly_between() {
        let p = NozzlePos(10.5);
        assert!(p.strictly_between(NozzlePos(1.0), NozzlePos(20.0)));
        assert!(p.strictly_between(NozzlePos(20.0), NozzlePos(1.0)));
        assert!(!p.strictly_between(NozzlePos(10.5), NozzlePos(20.0)));
        assert!(!p.strictly_between(NozzlePos(11.0), NozzlePos(20.0)));
    }

    #[test]
    fn inches_try_positive() {
        assert!(Inches::try_positive(20.0).is_ok());
        assert_eq!(Inches::try_positive(0.0), Err(NumericError::Zero));
        assert_eq!(Inches::try_positive(-1.0), Err(NumericError::Negative));
        assert_eq!(Inches::try_positive(f64::NAN), Err(NumericError::NaN));
        assert_eq!(Inches::try_positive(f64::INFINITY), Err(NumericError::Infinite));
    }

    #[test]
    fn span_feet_uses_spacing() {
        assert_eq!(Inches(20.0).span_feet(3.0), Feet(5.0));
        assert_eq!(Inches(30.0).span_feet(2.0), Feet(5.0));
    }

    #[test]
    fn feet_round_up_to_five() {
        assert_eq!(Feet(0.0).round_up_to(5), 5);
        assert_eq!(Feet(5.0).round_up_to(5), 5);
        assert_eq!(Feet(5.1).round_up_to(5), 10);
        assert_eq!(Feet(22.0).round_up_to(5), 25);
    }

    #[test]
    fn drawing_scale_puts_left_tip_at_offset() {
        let scale = DrawingScale::default();
        assert_eq!(scale.x(NozzlePos(0.5)), 30.0);
        assert_eq!(scale.x(NozzlePos(1.0)), 43.0);
        assert_eq!(scale.point(NozzlePos(0.5), 1.0), dvec2(30.0, 36.0));
    }

    #[test]
    fn drawing_scale_tiers() {
        let scale = DrawingScale::default();
        assert_eq!(scale.tier_y(1.0), 36.0);
        assert_eq!(scale.tier_y(0.0), 120.0);
    }
}
