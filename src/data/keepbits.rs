//! Keepbits: how many mantissa bits survive rounding.

use super::FloatFormat;
use crate::error::{BitinfoError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Number of mantissa bits to keep, either for every variable or per variable.
///
/// Values are stored signed so that out-of-range input from files or the
/// command line is reported as [`BitinfoError::InvalidKeepbits`] when it is
/// resolved, rather than as a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keepbits {
    /// The same count for every variable.
    Uniform(i64),
    /// A count per variable name.
    PerVariable(BTreeMap<String, i64>),
}

impl Keepbits {
    /// Build a per-variable mapping from validated counts.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self::PerVariable(
            counts
                .into_iter()
                .map(|(name, k)| (name.into(), k as i64))
                .collect(),
        )
    }

    /// Raw count for a variable, without range checking.
    pub fn raw_for(&self, name: &str) -> Result<i64> {
        match self {
            Self::Uniform(k) => Ok(*k),
            Self::PerVariable(map) => map
                .get(name)
                .copied()
                .ok_or_else(|| BitinfoError::VariableNotFound(name.to_string())),
        }
    }

    /// Count for a variable, checked against the variable's float format.
    pub fn resolve(&self, name: &str, format: FloatFormat) -> Result<u32> {
        check_keepbits(self.raw_for(name)?, format)
    }

    /// Load a mapping (or a bare integer) from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<u32> for Keepbits {
    fn from(k: u32) -> Self {
        Self::Uniform(k as i64)
    }
}

impl fmt::Display for Keepbits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uniform(k) => write!(f, "{} (all variables)", k),
            Self::PerVariable(map) => {
                for (i, (name, k)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, k)?;
                }
                Ok(())
            }
        }
    }
}

/// Validate a keepbits value against a format's mantissa width.
pub fn check_keepbits(keepbits: i64, format: FloatFormat) -> Result<u32> {
    if keepbits < 0 || keepbits > format.mantissa_bits as i64 {
        return Err(BitinfoError::InvalidKeepbits {
            keepbits,
            max: format.mantissa_bits,
        });
    }
    Ok(keepbits as u32)
}
