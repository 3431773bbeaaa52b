//! Pipeline runner: estimate information, pick keepbits, round.

use crate::data::{Dataset, Keepbits};
use crate::error::{BitinfoError, Result};
use crate::info::{bitinformation, BitInformation, InformationConfig};
use crate::keepbits::{get_keepbits, validate_inflevel};
use crate::round::bitround_dataset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

fn default_name() -> String {
    "unnamed".to_string()
}

fn default_inflevel() -> f64 {
    0.99
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the pipeline.
    #[serde(default = "default_name")]
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reduction dimension; `None` analyses every dimension.
    #[serde(default)]
    pub dim: Option<String>,
    /// Fraction of the real information to preserve.
    #[serde(default = "default_inflevel")]
    pub inflevel: f64,
    /// Estimator settings.
    #[serde(default)]
    pub information: InformationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: None,
            dim: None,
            inflevel: default_inflevel(),
            information: InformationConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(BitinfoError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(BitinfoError::from)
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(BitinfoError::from)
    }

    /// Save to pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(BitinfoError::from)
    }

    /// Load a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Check the inflevel and estimator settings.
    pub fn validate(&self) -> Result<()> {
        validate_inflevel(self.inflevel)?;
        self.information.validate()
    }
}

/// Everything a pipeline run produces.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Name of the pipeline that produced this result.
    pub name: String,
    pub bitinfo: BitInformation,
    pub keepbits: Keepbits,
    /// The input dataset, bitrounded.
    pub rounded: Dataset,
}

/// Builder for configuring and running a bitround pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Set the pipeline name.
    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    /// Reduce along one named dimension instead of all of them.
    pub fn dim(mut self, dim: &str) -> Self {
        self.config.dim = Some(dim.to_string());
        self
    }

    pub fn inflevel(mut self, inflevel: f64) -> Self {
        self.config.inflevel = inflevel;
        self
    }

    /// Noise-floor confidence level.
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.config.information.confidence = confidence;
        self
    }

    /// Keep information below the noise floor.
    pub fn keep_insignificant(mut self) -> Self {
        self.config.information.set_zero_insignificant = false;
        self
    }

    /// Exclude a fill value from the statistics.
    pub fn masked_value(mut self, value: f64) -> Self {
        self.config.information.masked_value = Some(value);
        self
    }

    /// Convert to config for serialization.
    pub fn to_config(&self, description: Option<&str>) -> PipelineConfig {
        PipelineConfig {
            description: description.map(String::from),
            ..self.config.clone()
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Estimate the information profile of every variable.
    pub fn analyze(&self, dataset: &Dataset) -> Result<BitInformation> {
        self.config.validate()?;
        bitinformation(dataset, self.config.dim.as_deref(), &self.config.information)
    }

    /// Run the pipeline on a dataset.
    pub fn run(&self, dataset: &Dataset) -> Result<PipelineResult> {
        self.config.validate()?;
        info!(
            pipeline = %self.config.name,
            n_variables = dataset.len(),
            inflevel = self.config.inflevel,
            "Running pipeline"
        );
        let bitinfo = self.analyze(dataset)?;
        let keepbits = get_keepbits(&bitinfo, self.config.inflevel)?;
        let rounded = bitround_dataset(dataset, &keepbits)?;
        Ok(PipelineResult {
            name: self.config.name.clone(),
            bitinfo,
            keepbits,
            rounded,
        })
    }
}
