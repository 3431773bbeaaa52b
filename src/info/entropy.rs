//! Binary entropies, per-bit information and the noise floor.

use crate::error::{BitinfoError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Shannon entropy in bits of a Bernoulli variable with `P(1) = p`.
///
/// Returns exactly 0 for `p` of 0 or 1.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    let q = 1.0 - p;
    -(p * p.log2() + q * q.log2())
}

/// Information a bit carries about its successor, from its 2×2 joint table.
///
/// Computes `H0 - H1` where `H0` is the entropy of the successor bit and
/// `H1` the entropy of the successor conditioned on the current bit,
/// clipped to `[0, 1]`. An empty table carries no information.
pub fn bit_information(table: [[u64; 2]; 2]) -> f64 {
    let [[c00, c01], [c10, c11]] = table;
    let n = (c00 + c01 + c10 + c11) as f64;
    if n == 0.0 {
        return 0.0;
    }

    let h0 = binary_entropy((c01 + c11) as f64 / n);

    let row0 = (c00 + c01) as f64;
    let row1 = (c10 + c11) as f64;
    let mut h1 = 0.0;
    if row0 > 0.0 {
        h1 += row0 / n * binary_entropy(c01 as f64 / row0);
    }
    if row1 > 0.0 {
        h1 += row1 / n * binary_entropy(c11 as f64 / row1);
    }

    (h0 - h1).clamp(0.0, 1.0)
}

/// Upper bound of the `confidence` interval for the probability of heads
/// after `n` tosses of a fair coin (normal approximation), capped at 1.
pub fn binomial_confidence(n: u64, confidence: f64) -> Result<f64> {
    if n == 0 {
        return Ok(1.0);
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| BitinfoError::Numerical(e.to_string()))?;
    let z = normal.inverse_cdf(1.0 - (1.0 - confidence) / 2.0);
    Ok((0.5 + z / (2.0 * (n as f64).sqrt())).min(1.0))
}

/// Information that `n` samples of pure i.i.d. noise can show by chance at
/// the given confidence level.
///
/// An unbiased random bit observed `n` times will, with probability
/// `confidence`, show a frequency no further from 0.5 than
/// [`binomial_confidence`]; the entropy deficit `1 - H(p)` at that frequency
/// is the largest apparent information attributable to sampling alone.
pub fn noise_floor(n: u64, confidence: f64) -> Result<f64> {
    let p = binomial_confidence(n, confidence)?;
    Ok(1.0 - binary_entropy(p))
}
