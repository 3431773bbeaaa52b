//! Analysis-to-rounding pipelines.

mod runner;

pub use runner::{Pipeline, PipelineConfig, PipelineResult};
