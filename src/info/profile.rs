//! Per-bit information profiles.

use crate::data::{BitKind, FloatFormat};
use crate::error::{BitinfoError, Result};
use crate::keepbits::select_keepbits;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Information content (in bits) of every bit position of one variable,
/// ordered from the sign bit to the last mantissa bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ProfileRecord")]
pub struct InformationProfile {
    format: FloatFormat,
    values: Vec<f64>,
    /// Pairs that entered the statistics.
    n_pairs: u64,
}

impl InformationProfile {
    /// Create a profile; `values` must have one entry per bit of `format`.
    pub fn new(format: FloatFormat, values: Vec<f64>, n_pairs: u64) -> Result<Self> {
        if ![FloatFormat::HALF, FloatFormat::SINGLE, FloatFormat::DOUBLE].contains(&format) {
            return Err(BitinfoError::UnsupportedFormat {
                dtype: format!("{:?}", format),
            });
        }
        if values.len() != format.width as usize {
            return Err(BitinfoError::DimensionMismatch {
                expected: format.width as usize,
                actual: values.len(),
            });
        }
        if let Some(bad) = values.iter().find(|v| !(v.is_finite() && **v >= 0.0)) {
            return Err(BitinfoError::Numerical(format!(
                "information content must be finite and non-negative, got {}",
                bad
            )));
        }
        Ok(Self {
            format,
            values,
            n_pairs,
        })
    }

    #[inline]
    pub fn format(&self) -> FloatFormat {
        self.format
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[inline]
    pub fn get(&self, bit: usize) -> Option<f64> {
        self.values.get(bit).copied()
    }

    #[inline]
    pub fn n_pairs(&self) -> u64 {
        self.n_pairs
    }

    /// Total information over all bits.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Running sum from the sign bit.
    pub fn cumulative(&self) -> Vec<f64> {
        self.values
            .iter()
            .scan(0.0, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect()
    }

    /// Running sum as a fraction of the total; all zeros when the total is 0.
    pub fn cumulative_fraction(&self) -> Vec<f64> {
        let cumsum = self.cumulative();
        let total = cumsum.last().copied().unwrap_or(0.0);
        if total <= 0.0 {
            return vec![0.0; cumsum.len()];
        }
        cumsum.into_iter().map(|c| c / total).collect()
    }

    /// Total information in the bits of one field.
    pub fn field_total(&self, kind: BitKind) -> f64 {
        self.values
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.format.bit_kind(*bit) == Some(kind))
            .map(|(_, v)| v)
            .sum()
    }

    /// Elementwise maximum with another profile of the same format.
    ///
    /// The pair count of the result is the smaller of the two.
    pub fn max(&self, other: &Self) -> Result<Self> {
        if self.format != other.format {
            return Err(BitinfoError::DimensionMismatch {
                expected: self.width(),
                actual: other.width(),
            });
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| a.max(*b))
            .collect();
        Ok(Self {
            format: self.format,
            values,
            n_pairs: self.n_pairs.min(other.n_pairs),
        })
    }
}

/// Unchecked serialized form, validated through [`InformationProfile::new`].
#[derive(Deserialize)]
struct ProfileRecord {
    format: FloatFormat,
    values: Vec<f64>,
    n_pairs: u64,
}

impl TryFrom<ProfileRecord> for InformationProfile {
    type Error = BitinfoError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        Self::new(record.format, record.values, record.n_pairs)
    }
}

/// Information profiles keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BitInformation {
    profiles: BTreeMap<String, InformationProfile>,
}

impl BitInformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, profile: InformationProfile) {
        self.profiles.insert(name.to_string(), profile);
    }

    /// Profile of a variable.
    pub fn get(&self, name: &str) -> Result<&InformationProfile> {
        self.profiles
            .get(name)
            .ok_or_else(|| BitinfoError::VariableNotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InformationProfile)> {
        self.profiles.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl FromIterator<(String, InformationProfile)> for BitInformation {
    fn from_iter<I: IntoIterator<Item = (String, InformationProfile)>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitInformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bitwise Information Content")?;
        for (name, profile) in self.iter() {
            let kb99 = select_keepbits(profile, 0.99).map_err(|_| fmt::Error)?;
            let kb100 = select_keepbits(profile, 0.999_999_999).map_err(|_| fmt::Error)?;
            let fmt_bits = |kind: BitKind| {
                profile
                    .values()
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| profile.format().bit_kind(*bit) == Some(kind))
                    .map(|(_, v)| format!("{:.2}", v))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            writeln!(f)?;
            writeln!(
                f,
                "{} ({}-bit, {} pairs)",
                name,
                profile.width(),
                profile.n_pairs()
            )?;
            writeln!(f, "  Total information: {:.3} bits", profile.total())?;
            writeln!(f, "  Keepbits (99%):    {}", kb99)?;
            writeln!(f, "  Keepbits (100%):   {}", kb100)?;
            writeln!(f, "  Sign:      {}", fmt_bits(BitKind::Sign))?;
            writeln!(f, "  Exponent:  {}", fmt_bits(BitKind::Exponent))?;
            writeln!(f, "  Mantissa:  {}", fmt_bits(BitKind::Mantissa))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile_with(entries: &[(usize, f64)]) -> InformationProfile {
        let mut values = vec![0.0; 32];
        for &(bit, v) in entries {
            values[bit] = v;
        }
        InformationProfile::new(FloatFormat::SINGLE, values, 1000).unwrap()
    }

    #[test]
    fn test_length_must_match_width() {
        assert!(InformationProfile::new(FloatFormat::SINGLE, vec![0.0; 64], 0).is_err());
        assert!(InformationProfile::new(FloatFormat::DOUBLE, vec![0.0; 64], 0).is_ok());
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let mut values = vec![0.0; 32];
        values[3] = -0.1;
        assert!(InformationProfile::new(FloatFormat::SINGLE, values.clone(), 0).is_err());
        values[3] = f64::NAN;
        assert!(InformationProfile::new(FloatFormat::SINGLE, values, 0).is_err());
    }

    #[test]
    fn test_deserialization_is_validated() {
        let p = profile_with(&[(9, 0.7)]);
        let json = serde_json::to_string(&p).unwrap();
        let back: InformationProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);

        let short = json.replacen("[0.0,", "[", 1);
        assert!(serde_json::from_str::<InformationProfile>(&short).is_err());
        let negative = json.replace("0.7", "-0.7");
        assert!(serde_json::from_str::<InformationProfile>(&negative).is_err());
        let odd_format = json.replace("\"mantissa_bits\":23", "\"mantissa_bits\":5");
        assert!(serde_json::from_str::<InformationProfile>(&odd_format).is_err());
    }

    #[test]
    fn test_cumulative_fraction() {
        let p = profile_with(&[(2, 1.0), (9, 0.5), (10, 0.5)]);
        assert_relative_eq!(p.total(), 2.0);
        let cdf = p.cumulative_fraction();
        assert_relative_eq!(cdf[1], 0.0);
        assert_relative_eq!(cdf[2], 0.5);
        assert_relative_eq!(cdf[9], 0.75, epsilon = 1e-12);
        assert_relative_eq!(cdf[31], 1.0);
    }

    #[test]
    fn test_cumulative_fraction_of_empty_profile() {
        let p = profile_with(&[]);
        assert!(p.cumulative_fraction().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_field_totals() {
        let p = profile_with(&[(0, 0.1), (4, 0.2), (8, 0.3), (9, 0.4), (31, 0.5)]);
        assert_relative_eq!(p.field_total(BitKind::Sign), 0.1, epsilon = 1e-12);
        assert_relative_eq!(p.field_total(BitKind::Exponent), 0.5, epsilon = 1e-12);
        assert_relative_eq!(p.field_total(BitKind::Mantissa), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_elementwise_max() {
        let a = profile_with(&[(9, 0.8), (10, 0.1)]);
        let b = profile_with(&[(9, 0.2), (10, 0.6)]);
        let m = a.max(&b).unwrap();
        assert_eq!(m.get(9), Some(0.8));
        assert_eq!(m.get(10), Some(0.6));
    }

    #[test]
    fn test_collection_lookup_and_report() {
        let info: BitInformation = vec![("air".to_string(), profile_with(&[(9, 1.0)]))]
            .into_iter()
            .collect();
        assert!(info.get("air").is_ok());
        assert!(matches!(
            info.get("rain"),
            Err(BitinfoError::VariableNotFound(_))
        ));
        let report = info.to_string();
        assert!(report.contains("air (32-bit, 1000 pairs)"));
        assert!(report.contains("Keepbits (99%):    1"));
    }
}
