//! Length resolver – converts symbolic print lengths (inches, points,
//! millimetres, pixels) into device pixels at the current preview zoom.
//!
//! The resolver is a pure leaf: it never caches, so callers always see the
//! live value of user-adjustable lengths such as margin and paper height.

use std::fmt;

/// CSS reference resolution: 96 device pixels per inch at zoom 1.0.
pub const REFERENCE_DPI: f32 = 96.0;

/// Unit of a symbolic length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    In,
    Pt,
    Mm,
    Px,
}

/// A length with an explicit unit, e.g. `0.75in` or `13px`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Length {
    pub value: f32,
    pub unit: Unit,
}

impl Length {
    pub const fn new(value: f32, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub const fn inches(value: f32) -> Self {
        Self::new(value, Unit::In)
    }

    pub const fn px(value: f32) -> Self {
        Self::new(value, Unit::Px)
    }

    pub const fn mm(value: f32) -> Self {
        Self::new(value, Unit::Mm)
    }

    /// Parse a length string such as `"0.75in"`, `"12pt"`, `"10mm"` or
    /// `"64px"`. A bare number is pixels. Returns `None` for anything that
    /// does not coerce to a finite number.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        let (number, unit) = if let Some(v) = s.strip_suffix("in") {
            (v, Unit::In)
        } else if let Some(v) = s.strip_suffix("pt") {
            (v, Unit::Pt)
        } else if let Some(v) = s.strip_suffix("mm") {
            (v, Unit::Mm)
        } else if let Some(v) = s.strip_suffix("px") {
            (v, Unit::Px)
        } else {
            (s, Unit::Px)
        };
        let value: f32 = number.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self::new(value, unit))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            Unit::In => "in",
            Unit::Pt => "pt",
            Unit::Mm => "mm",
            Unit::Px => "px",
        };
        write!(f, "{}{}", self.value, suffix)
    }
}

/// The scale at which symbolic lengths are materialised: a reference DPI and
/// the user's preview zoom multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub dpi: f32,
    pub zoom: f32,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            dpi: REFERENCE_DPI,
            zoom: 1.0,
        }
    }
}

impl Scale {
    pub fn with_zoom(zoom: f32) -> Self {
        Self {
            dpi: REFERENCE_DPI,
            zoom,
        }
    }

    /// Resolve a symbolic length to device pixels at the current zoom.
    ///
    /// Returns `0.0` for a missing or degenerate input. Callers must treat
    /// `0.0` as "unresolved" and disable pagination rather than divide by it.
    pub fn resolve(&self, length: Option<Length>) -> f32 {
        let Some(length) = length else {
            return 0.0;
        };
        if !length.value.is_finite() || length.value <= 0.0 {
            return 0.0;
        }
        let px_per_inch = self.dpi * self.zoom;
        if !(px_per_inch.is_finite() && px_per_inch > 0.0) {
            return 0.0;
        }
        match length.unit {
            Unit::In => length.value * px_per_inch,
            Unit::Pt => length.value * px_per_inch / 72.0,
            Unit::Mm => length.value * px_per_inch / 25.4,
            Unit::Px => length.value * self.zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_units() {
        assert_eq!(Length::parse("0.75in"), Some(Length::inches(0.75)));
        assert_eq!(Length::parse("12pt"), Some(Length::new(12.0, Unit::Pt)));
        assert_eq!(Length::parse("10mm"), Some(Length::mm(10.0)));
        assert_eq!(Length::parse("64px"), Some(Length::px(64.0)));
        // Bare numbers are pixels.
        assert_eq!(Length::parse(" 14 "), Some(Length::px(14.0)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Length::parse(""), None);
        assert_eq!(Length::parse("abc"), None);
        assert_eq!(Length::parse("in"), None);
        assert_eq!(Length::parse("NaNpx"), None);
    }

    #[test]
    fn resolve_at_reference_scale() {
        let scale = Scale::default();
        assert_eq!(scale.resolve(Some(Length::inches(1.0))), 96.0);
        assert_eq!(scale.resolve(Some(Length::new(72.0, Unit::Pt))), 96.0);
        assert_eq!(scale.resolve(Some(Length::px(50.0))), 50.0);
        let mm = scale.resolve(Some(Length::mm(25.4)));
        assert!((mm - 96.0).abs() < 1e-3);
    }

    #[test]
    fn resolve_applies_zoom() {
        let scale = Scale::with_zoom(1.5);
        assert_eq!(scale.resolve(Some(Length::inches(1.0))), 144.0);
        assert_eq!(scale.resolve(Some(Length::px(100.0))), 150.0);
    }

    #[test]
    fn unresolved_inputs_yield_zero() {
        let scale = Scale::default();
        assert_eq!(scale.resolve(None), 0.0);
        assert_eq!(scale.resolve(Some(Length::px(0.0))), 0.0);
        assert_eq!(scale.resolve(Some(Length::px(-3.0))), 0.0);
        assert_eq!(Scale::with_zoom(0.0).resolve(Some(Length::inches(1.0))), 0.0);
    }
}
