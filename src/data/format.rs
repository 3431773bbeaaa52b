//! IEEE floating-point layouts and the non-mantissa bit table.

use crate::error::{BitinfoError, Result};
use serde::{Deserialize, Serialize};

/// Bit layout of an IEEE binary floating-point format.
///
/// Bits are indexed from the sign bit (index 0) down to the least
/// significant mantissa bit (index `width - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatFormat {
    /// Total bit width.
    pub width: u32,
    /// Number of exponent bits.
    pub exponent_bits: u32,
    /// Number of explicitly stored mantissa bits.
    pub mantissa_bits: u32,
    /// Exponent bias.
    pub bias: i32,
}

impl FloatFormat {
    /// IEEE binary16.
    pub const HALF: FloatFormat = FloatFormat {
        width: 16,
        exponent_bits: 5,
        mantissa_bits: 10,
        bias: 15,
    };

    /// IEEE binary32.
    pub const SINGLE: FloatFormat = FloatFormat {
        width: 32,
        exponent_bits: 8,
        mantissa_bits: 23,
        bias: 127,
    };

    /// IEEE binary64.
    pub const DOUBLE: FloatFormat = FloatFormat {
        width: 64,
        exponent_bits: 11,
        mantissa_bits: 52,
        bias: 1023,
    };

    /// Format for an array element width. Only 32 and 64 bits are supported
    /// for analysis and rounding.
    pub fn for_width(width: u32) -> Result<Self> {
        match width {
            32 => Ok(Self::SINGLE),
            64 => Ok(Self::DOUBLE),
            other => Err(BitinfoError::UnsupportedFormat {
                dtype: format!("{}-bit float", other),
            }),
        }
    }

    /// Position of the sign bit (always the first bit).
    #[inline]
    pub fn sign_bit(&self) -> usize {
        0
    }

    /// Number of sign plus exponent bits, which are never rounded away.
    #[inline]
    pub fn non_mantissa_bits(&self) -> u32 {
        1 + self.exponent_bits
    }

    /// Bit index of the first mantissa bit.
    #[inline]
    pub fn first_mantissa_bit(&self) -> usize {
        self.non_mantissa_bits() as usize
    }

    /// Describe which part of the representation bit `bit` belongs to.
    pub fn bit_kind(&self, bit: usize) -> Option<BitKind> {
        if bit >= self.width as usize {
            None
        } else if bit == 0 {
            Some(BitKind::Sign)
        } else if bit < self.first_mantissa_bit() {
            Some(BitKind::Exponent)
        } else {
            Some(BitKind::Mantissa)
        }
    }
}

/// Field of a floating-point representation a bit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitKind {
    Sign,
    Exponent,
    Mantissa,
}

/// Sign plus exponent bits per total bit width.
pub static NON_MANTISSA_BITS: [(u32, u32); 3] = [(16, 6), (32, 9), (64, 12)];

/// Look up the number of sign plus exponent bits for a total bit width.
pub fn non_mantissa_bits(width: u32) -> Result<u32> {
    NON_MANTISSA_BITS
        .iter()
        .find(|(w, _)| *w == width)
        .map(|(_, n)| *n)
        .ok_or_else(|| BitinfoError::UnsupportedFormat {
            dtype: format!("{}-bit float", width),
        })
}
