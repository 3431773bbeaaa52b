//! Bitwise Information Content and Bitrounding Library
//!
//! This library estimates how many bits of each floating-point value in a
//! gridded dataset carry real information, and rounds the rest away so the
//! data compresses well without losing what matters.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (FloatFormat, Variable, Dataset, Keepbits)
//! - **bits**: Bit-level views of floats (bit patterns, bit planes)
//! - **info**: Bitwise real information content along a dimension
//! - **keepbits**: Mantissa bits needed to preserve an information level
//! - **round**: Round-to-nearest-even bitrounding
//! - **pipeline**: Analysis-to-rounding pipeline composition and execution
//! - **synthetic**: Synthetic gridded datasets
//!
//! # Example
//!
//! ```no_run
//! use bitinfo::prelude::*;
//!
//! // Load data
//! let dataset = Dataset::from_json_file("air.json").unwrap();
//!
//! // Keep 99% of the real information along longitude
//! let result = Pipeline::new()
//!     .dim("lon")
//!     .inflevel(0.99)
//!     .run(&dataset)
//!     .unwrap();
//!
//! println!("{}", result.bitinfo);
//! result.rounded.to_json_file("air_rounded.json").unwrap();
//! ```

pub mod bits;
pub mod data;
pub mod error;
pub mod info;
pub mod keepbits;
pub mod pipeline;
pub mod round;
pub mod synthetic;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::bits::{bitplane, bitplanes, BitFloat};
    pub use crate::data::{
        check_keepbits, non_mantissa_bits, BitKind, Dataset, FloatArray, FloatFormat, Keepbits,
        Variable, KEEPBITS_ATTRIBUTE,
    };
    pub use crate::error::{BitinfoError, Result};
    pub use crate::info::{
        bitinformation, bitinformation_array, bitinformation_variable, BitInformation,
        InformationConfig, InformationProfile,
    };
    pub use crate::keepbits::{get_keepbits, get_keepbits_levels, select_keepbits};
    pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineResult};
    pub use crate::round::{
        bitround, bitround_along_dim, bitround_dataset, bitround_value, bitround_variable,
        DEFAULT_INFLEVELS,
    };
    pub use crate::synthetic::{generate_synthetic, Precision, SyntheticConfig};
}
