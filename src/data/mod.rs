//! Data structures: float formats, variables, datasets and keepbits.

mod dataset;
mod format;
mod keepbits;
mod variable;

pub use dataset::Dataset;
pub use format::{non_mantissa_bits, BitKind, FloatFormat, NON_MANTISSA_BITS};
pub use keepbits::{check_keepbits, Keepbits};
pub use variable::{FloatArray, Variable, KEEPBITS_ATTRIBUTE};
