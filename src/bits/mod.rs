//! Bit-level views of floating-point values.
//!
//! Reinterprets floats as their raw sign/exponent/mantissa bits without
//! changing any bit pattern.

mod float;
mod plane;

pub use float::BitFloat;
pub use plane::{bit_of, bit_pattern, bitplane, bitplanes};
