//! Estimator settings.

use crate::error::{BitinfoError, Result};
use serde::{Deserialize, Serialize};

/// Settings for the bitwise information estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InformationConfig {
    /// Confidence level of the noise-floor test, in (0, 1).
    pub confidence: f64,
    /// Zero out information at or below the noise floor.
    pub set_zero_insignificant: bool,
    /// Fill value excluded from the statistics like NaN.
    pub masked_value: Option<f64>,
}

impl Default for InformationConfig {
    fn default() -> Self {
        Self {
            confidence: 0.99,
            set_zero_insignificant: true,
            masked_value: None,
        }
    }
}

impl InformationConfig {
    /// Set the noise-floor confidence level.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Enable or disable the noise-floor correction.
    pub fn with_set_zero_insignificant(mut self, enabled: bool) -> Self {
        self.set_zero_insignificant = enabled;
        self
    }

    /// Exclude a fill value from the statistics.
    pub fn with_masked_value(mut self, value: f64) -> Self {
        self.masked_value = Some(value);
        self
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(BitinfoError::InvalidParameter(format!(
                "confidence must lie in (0, 1), got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}
