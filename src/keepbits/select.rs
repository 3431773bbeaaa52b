//! Smallest mantissa width preserving a fraction of the real information.

use crate::data::{non_mantissa_bits, Keepbits};
use crate::error::{BitinfoError, Result};
use crate::info::{BitInformation, InformationProfile};
use tracing::debug;

/// Check that an inflevel lies in (0, 1].
pub fn validate_inflevel(inflevel: f64) -> Result<()> {
    if inflevel > 0.0 && inflevel <= 1.0 {
        Ok(())
    } else {
        Err(BitinfoError::InvalidInflevel(inflevel))
    }
}

/// Number of mantissa bits needed to retain `inflevel` of the information in
/// `profile`.
///
/// Finds the first bit at which the cumulative information reaches
/// `inflevel × total` and counts the mantissa bits up to and including it.
/// Information that is already captured by the sign and exponent needs no
/// mantissa bits; a profile without information yields 0.
pub fn select_keepbits(profile: &InformationProfile, inflevel: f64) -> Result<u32> {
    validate_inflevel(inflevel)?;
    let format = profile.format();
    let nonmantissa = non_mantissa_bits(format.width)? as i64;

    let cumsum = profile.cumulative();
    let total = cumsum.last().copied().unwrap_or(0.0);
    if total <= 0.0 {
        return Ok(0);
    }

    let threshold = inflevel * total;
    let last_bit = cumsum.len() - 1;
    let bit = cumsum
        .iter()
        .position(|&c| c >= threshold)
        .unwrap_or(last_bit);

    let keepbits = (bit as i64 + 1 - nonmantissa).clamp(0, format.mantissa_bits as i64);
    Ok(keepbits as u32)
}

/// Keepbits for every variable, each selected from its own profile.
pub fn get_keepbits(bitinfo: &BitInformation, inflevel: f64) -> Result<Keepbits> {
    validate_inflevel(inflevel)?;
    let counts = bitinfo
        .iter()
        .map(|(name, profile)| {
            let k = select_keepbits(profile, inflevel)?;
            debug!(variable = name, inflevel, keepbits = k, "Selected keepbits");
            Ok((name.to_string(), k))
        })
        .collect::<Result<Vec<(String, u32)>>>()?;
    Ok(Keepbits::from_counts(counts))
}

/// Keepbits for several inflevels at once, in the order given.
pub fn get_keepbits_levels(
    bitinfo: &BitInformation,
    inflevels: &[f64],
) -> Result<Vec<(f64, Keepbits)>> {
    if inflevels.is_empty() {
        return Err(BitinfoError::InvalidParameter(
            "at least one inflevel is required".to_string(),
        ));
    }
    inflevels
        .iter()
        .map(|&level| Ok((level, get_keepbits(bitinfo, level)?)))
        .collect()
}
