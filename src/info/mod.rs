//! Bitwise real information content estimation.
//!
//! For every bit position the estimator counts how often adjacent values
//! along a reduction dimension share or flip that bit, turns the 2×2 joint
//! table into the information the bit carries about its neighbour, and
//! zeroes whatever does not exceed the level pure noise would reach with the
//! same number of samples.

mod config;
mod counts;
mod entropy;
mod estimator;
mod profile;

pub use config::InformationConfig;
pub use counts::BitPairCounts;
pub use entropy::{binary_entropy, binomial_confidence, bit_information, noise_floor};
pub use estimator::{
    bit_pair_counts, bitinformation, bitinformation_array, bitinformation_variable,
    profile_from_counts,
};
pub use profile::{BitInformation, InformationProfile};
