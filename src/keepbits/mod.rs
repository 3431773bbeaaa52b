//! Keepbits selection from information profiles.

mod select;

pub use select::{get_keepbits, get_keepbits_levels, select_keepbits, validate_inflevel};
