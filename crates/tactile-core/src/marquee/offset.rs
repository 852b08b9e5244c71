//! L4 Atomic Layer: Horizontal item offsets and snapping
//!
//! An item's displacement is carried as a percentage of its own measured
//! width so the rendered transform does not depend on later width changes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::timing::snap_to;

/// Rounding applied to computed percentages
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Snap {
    /// Keep raw values (`snap = false`)
    Off,
    /// Round to the nearest multiple of the increment
    Increment(f64),
}

impl Default for Snap {
    fn default() -> Self {
        Snap::Increment(1.0)
    }
}

impl Snap {
    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Snap::Off => value,
            Snap::Increment(step) if *step > 0.0 => snap_to(value, *step),
            Snap::Increment(_) => value,
        }
    }
}

impl Serialize for Snap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Snap::Off => serializer.serialize_bool(false),
            Snap::Increment(step) => serializer.serialize_f64(*step),
        }
    }
}

// Accepts `false`, `true` (default increment) or a number
impl<'de> Deserialize<'de> for Snap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SnapVisitor;

        impl<'de> Visitor<'de> for SnapVisitor {
            type Value = Snap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("false or a positive snap increment")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Snap, E>
            where
                E: de::Error,
            {
                Ok(if value { Snap::default() } else { Snap::Off })
            }

            fn visit_f64<E>(self, value: f64) -> Result<Snap, E>
            where
                E: de::Error,
            {
                Ok(Snap::Increment(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Snap, E>
            where
                E: de::Error,
            {
                Ok(Snap::Increment(value as f64))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Snap, E>
            where
                E: de::Error,
            {
                Ok(Snap::Increment(value as f64))
            }
        }

        deserializer.deserialize_any(SnapVisitor)
    }
}

/// Displacement of one item, tracked in both pixels and percent of width
///
/// Conversion rules:
/// - `pixels = percent / 100 * width`
/// - `percent = pixels / width * 100`
/// - a zero or non-finite width has no percent representation; it maps to 0
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ItemOffset {
    pub pixel_offset: f64,
    pub percent_offset: f64,
    pub width_at_measurement: f64,
}

impl ItemOffset {
    pub fn new(pixel_offset: f64, percent_offset: f64, width: f64) -> Self {
        Self {
            pixel_offset,
            percent_offset,
            width_at_measurement: width,
        }
    }

    /// Offset carried purely as a percentage
    pub fn from_percent(percent: f64, width: f64) -> Self {
        Self::new(0.0, percent, width)
    }

    #[inline]
    pub fn has_measurable_width(&self) -> bool {
        self.width_at_measurement.is_finite() && self.width_at_measurement > 0.0
    }

    /// Convert a pixel distance into percent of this item's width
    #[inline]
    pub fn percent_of(&self, pixels: f64) -> f64 {
        if self.has_measurable_width() {
            pixels / self.width_at_measurement * 100.0
        } else {
            0.0
        }
    }

    /// Convert a percentage of this item's width into pixels
    #[inline]
    pub fn pixels_of(&self, percent: f64) -> f64 {
        if self.has_measurable_width() {
            percent / 100.0 * self.width_at_measurement
        } else {
            0.0
        }
    }

    /// Total displacement in pixels
    #[inline]
    pub fn to_pixels(&self) -> f64 {
        self.pixel_offset + self.pixels_of(self.percent_offset)
    }

    /// Fold the pixel part into a snapped percentage and zero the pixels
    pub fn normalized(&self, snap: Snap) -> Self {
        if !self.has_measurable_width() {
            return Self::from_percent(0.0, self.width_at_measurement);
        }
        let percent = snap.apply(self.percent_of(self.pixel_offset) + self.percent_offset);
        Self::from_percent(percent, self.width_at_measurement)
    }

    /// Same width, different percentage
    pub fn with_percent(&self, percent: f64) -> Self {
        Self::from_percent(percent, self.width_at_measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let offset = ItemOffset::new(50.0, 10.0, 500.0);
        assert_eq!(offset.percent_of(50.0), 10.0);
        assert_eq!(offset.pixels_of(10.0), 50.0);
        assert_eq!(offset.to_pixels(), 100.0);
    }

    #[test]
    fn test_normalize_moves_pixels_into_percent() {
        let offset = ItemOffset::new(52.0, 0.0, 500.0).normalized(Snap::default());
        assert_eq!(offset.pixel_offset, 0.0);
        assert_eq!(offset.percent_offset, 10.0);

        let raw = ItemOffset::new(52.0, 0.0, 500.0).normalized(Snap::Off);
        assert!((raw.percent_offset - 10.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_width_is_degenerate() {
        let offset = ItemOffset::new(30.0, 20.0, 0.0);
        assert!(!offset.has_measurable_width());
        assert_eq!(offset.percent_of(100.0), 0.0);
        assert_eq!(offset.normalized(Snap::default()).percent_offset, 0.0);

        let nan = ItemOffset::new(0.0, 0.0, f64::NAN);
        assert!(!nan.has_measurable_width());
    }

    #[test]
    fn test_snap_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            snap: Snap,
        }
        let w: Wrapper = toml::from_str("snap = false").unwrap();
        assert_eq!(w.snap, Snap::Off);
        let w: Wrapper = toml::from_str("snap = 0.5").unwrap();
        assert_eq!(w.snap, Snap::Increment(0.5));
        let w: Wrapper = toml::from_str("snap = 2").unwrap();
        assert_eq!(w.snap, Snap::Increment(2.0));
        let w: Wrapper = toml::from_str("snap = true").unwrap();
        assert_eq!(w.snap, Snap::Increment(1.0));
    }
}
