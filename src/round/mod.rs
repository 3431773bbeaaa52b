//! Bit rounding: round-to-nearest-even at an arbitrary mantissa width.

mod along;
mod codec;

pub use along::{bitround_along_dim, DEFAULT_INFLEVELS};
pub use codec::{bitround, bitround_dataset, bitround_value, bitround_variable, round_bits};
