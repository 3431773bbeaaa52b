//! Raw bit access for the supported float element types.

use crate::data::FloatFormat;
use std::fmt::Debug;

/// A floating-point element type whose raw representation can be read and
/// written as an unsigned integer.
///
/// Raw patterns are widened to `u64` so callers can treat both widths
/// uniformly; only the low `FORMAT.width` bits are ever set.
pub trait BitFloat: Copy + Send + Sync + PartialEq + PartialOrd + Debug + 'static {
    /// Bit layout of this type.
    const FORMAT: FloatFormat;

    /// Raw bit pattern, zero-extended to 64 bits.
    fn to_raw(self) -> u64;

    /// Value with the given raw bit pattern (high bits beyond the width are ignored).
    fn from_raw(raw: u64) -> Self;

    /// Whether the value is NaN.
    fn is_nan(self) -> bool;

    /// Lossless widening to f64.
    fn to_f64(self) -> f64;

    /// Conversion from f64 (rounding to nearest for narrower types).
    fn from_f64(value: f64) -> Self;
}

impl BitFloat for f32 {
    const FORMAT: FloatFormat = FloatFormat::SINGLE;

    #[inline]
    fn to_raw(self) -> u64 {
        self.to_bits() as u64
    }

    #[inline]
    fn from_raw(raw: u64) -> Self {
        f32::from_bits(raw as u32)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl BitFloat for f64 {
    const FORMAT: FloatFormat = FloatFormat::DOUBLE;

    #[inline]
    fn to_raw(self) -> u64 {
        self.to_bits()
    }

    #[inline]
    fn from_raw(raw: u64) -> Self {
        f64::from_bits(raw)
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip_preserves_bits() {
        let values = [0.0f32, -0.0, 1.5, f32::INFINITY, f32::MIN_POSITIVE / 4.0];
        for v in values {
            assert_eq!(<f32 as BitFloat>::from_raw(v.to_raw()).to_bits(), v.to_bits());
        }
        let nan = f64::from_bits(0x7ff8_0000_0000_0abc);
        assert_eq!(<f64 as BitFloat>::from_raw(nan.to_raw()).to_bits(), nan.to_bits());
    }

    #[test]
    fn test_f32_raw_fits_width() {
        assert_eq!((-1.0f32).to_raw() >> 32, 0);
        assert_eq!((-1.0f32).to_raw(), 0xbf80_0000);
    }
}
