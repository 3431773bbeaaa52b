//! Synthetic gridded datasets for testing, demos and benchmarking.
//!
//! Fields are smooth climatologies plus controllable white noise, so the
//! amount of real information in the trailing mantissa bits is known in
//! advance.

mod generate;

pub use generate::{generate_synthetic, Precision, SyntheticConfig};
