//! bitinfo - bitwise information content and bitrounding CLI
//!
//! Command-line interface for estimating the real information in floating
//! point datasets and rounding away the bits that carry none.

use bitinfo::data::{Dataset, Keepbits};
use bitinfo::error::{BitinfoError, Result};
use bitinfo::info::{bitinformation, InformationConfig};
use bitinfo::keepbits::get_keepbits_levels;
use bitinfo::pipeline::{Pipeline, PipelineConfig};
use bitinfo::round::{bitround_along_dim, bitround_dataset, DEFAULT_INFLEVELS};
use bitinfo::synthetic::{generate_synthetic, Precision, SyntheticConfig};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// Output format for reports
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable table
    Text,
    Json,
    Yaml,
}

/// Synthetic dataset presets
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Smooth fields with a little noise
    Default,
    /// Noise-free fields
    Smooth,
    /// Noise-dominated fields
    Noisy,
    /// Double precision with missing values
    GappyDouble,
}

/// Bitwise information content and bitrounding of gridded float data
#[derive(Parser)]
#[command(name = "bitinfo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level: trace, debug, info, warn or error
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Estimator options shared by the analysing subcommands.
#[derive(Args, Debug, Clone)]
struct EstimatorArgs {
    /// Dimension to analyse along (default: every dimension, per-bit maximum)
    #[arg(short, long)]
    dim: Option<String>,

    /// Confidence level of the noise-floor test
    #[arg(long, default_value = "0.99")]
    confidence: f64,

    /// Keep information below the noise floor
    #[arg(long)]
    keep_insignificant: bool,

    /// Fill value excluded from the statistics
    #[arg(long, allow_negative_numbers = true)]
    masked_value: Option<f64>,
}

impl EstimatorArgs {
    fn config(&self) -> InformationConfig {
        InformationConfig {
            confidence: self.confidence,
            set_zero_insignificant: !self.keep_insignificant,
            masked_value: self.masked_value,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the bitwise information content of a dataset
    Analyze {
        /// Path to dataset JSON
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        estimator: EstimatorArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute keepbits for one or more information levels
    Keepbits {
        /// Path to dataset JSON
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        estimator: EstimatorArgs,

        /// Information level(s) to preserve (repeatable)
        #[arg(short = 'l', long = "inflevel", default_values_t = vec![0.99])]
        inflevels: Vec<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Bitround a dataset with given keepbits
    Round {
        /// Path to dataset JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the rounded dataset JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Keepbits applied to every variable
        #[arg(short, long, allow_negative_numbers = true, conflicts_with = "keepbits_file")]
        keepbits: Option<i64>,

        /// JSON file with keepbits per variable (or a single integer)
        #[arg(long, required_unless_present = "keepbits")]
        keepbits_file: Option<PathBuf>,
    },

    /// Round consecutive slabs along a dimension with different inflevels
    Compare {
        /// Path to dataset JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the rounded dataset JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Dimension to split into slabs
        #[arg(long)]
        along: String,

        #[command(flatten)]
        estimator: EstimatorArgs,

        /// Information levels, one per slab
        #[arg(short = 'l', long = "inflevel", default_values_t = DEFAULT_INFLEVELS.to_vec())]
        inflevels: Vec<f64>,
    },

    /// Run a pipeline from a YAML configuration file
    Run {
        /// Path to pipeline configuration YAML
        #[arg(short, long)]
        config: PathBuf,

        /// Path to dataset JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the rounded dataset JSON
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the information profiles as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Write a synthetic dataset
    Synthesize {
        /// Output path for the dataset JSON
        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long, value_enum, default_value = "default")]
        preset: Preset,

        /// Grid size as time,lat,lon
        #[arg(long, value_delimiter = ',', num_args = 3)]
        shape: Option<Vec<usize>>,

        /// Use double precision
        #[arg(long)]
        double: bool,

        /// Relative noise level
        #[arg(long)]
        noise: Option<f64>,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Generate an example pipeline configuration
    Example {
        /// Output path for example YAML
        #[arg(short, long, default_value = "example_pipeline.yaml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = cli
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            input,
            estimator,
            format,
            output,
        } => cmd_analyze(&input, &estimator, format, output.as_deref()),

        Commands::Keepbits {
            input,
            estimator,
            inflevels,
            format,
        } => cmd_keepbits(&input, &estimator, &inflevels, format),

        Commands::Round {
            input,
            output,
            keepbits,
            keepbits_file,
        } => cmd_round(&input, &output, keepbits, keepbits_file.as_deref()),

        Commands::Compare {
            input,
            output,
            along,
            estimator,
            inflevels,
        } => cmd_compare(&input, &output, &along, &estimator, &inflevels),

        Commands::Run {
            config,
            input,
            output,
            report,
        } => cmd_run(&config, &input, &output, report.as_deref()),

        Commands::Synthesize {
            output,
            preset,
            shape,
            double,
            noise,
            seed,
        } => cmd_synthesize(&output, preset, shape.as_deref(), double, noise, seed),

        Commands::Example { output } => cmd_example(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    eprintln!("Loading dataset from {:?}...", path);
    let dataset = Dataset::from_json_file(path)?;
    eprintln!(
        "Loaded {} variable(s): {}",
        dataset.len(),
        dataset.names().join(", ")
    );
    Ok(dataset)
}

/// Estimate information profiles
fn cmd_analyze(
    input: &Path,
    estimator: &EstimatorArgs,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let dataset = load_dataset(input)?;
    let bitinfo = bitinformation(&dataset, estimator.dim.as_deref(), &estimator.config())?;

    let report = match format {
        OutputFormat::Text => bitinfo.to_string(),
        OutputFormat::Json => bitinfo.to_json()?,
        OutputFormat::Yaml => bitinfo.to_yaml()?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, &report)?;
            eprintln!("Wrote report to {:?}", path);
        }
        None => println!("{}", report),
    }
    Ok(())
}

/// Keepbits per variable for each requested inflevel
fn cmd_keepbits(
    input: &Path,
    estimator: &EstimatorArgs,
    inflevels: &[f64],
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(input)?;
    let bitinfo = bitinformation(&dataset, estimator.dim.as_deref(), &estimator.config())?;
    let levels = get_keepbits_levels(&bitinfo, inflevels)?;

    match format {
        OutputFormat::Text => {
            println!("Keepbits");
            println!("========");
            for (inflevel, keepbits) in &levels {
                println!("  inflevel {:<10} {}", inflevel, keepbits);
            }
        }
        OutputFormat::Json | OutputFormat::Yaml => {
            let entries: Vec<serde_json::Value> = levels
                .iter()
                .map(|(inflevel, keepbits)| {
                    serde_json::json!({ "inflevel": inflevel, "keepbits": keepbits })
                })
                .collect();
            let out = match format {
                OutputFormat::Json => serde_json::to_string_pretty(&entries)?,
                _ => serde_yaml::to_string(&entries)?,
            };
            println!("{}", out);
        }
    }
    Ok(())
}

/// Round with fixed keepbits
fn cmd_round(
    input: &Path,
    output: &Path,
    keepbits: Option<i64>,
    keepbits_file: Option<&Path>,
) -> Result<()> {
    let keepbits = match (keepbits, keepbits_file) {
        (Some(k), _) => Keepbits::Uniform(k),
        (None, Some(path)) => Keepbits::from_json_str(&std::fs::read_to_string(path)?)?,
        (None, None) => {
            return Err(BitinfoError::InvalidParameter(
                "either --keepbits or --keepbits-file is required".to_string(),
            ))
        }
    };

    let dataset = load_dataset(input)?;
    eprintln!("Bitrounding with keepbits {}...", keepbits);
    let rounded = bitround_dataset(&dataset, &keepbits)?;

    rounded.to_json_file(output)?;
    eprintln!("Wrote rounded dataset to {:?}", output);
    Ok(())
}

/// Slab-wise comparison of inflevels
fn cmd_compare(
    input: &Path,
    output: &Path,
    along: &str,
    estimator: &EstimatorArgs,
    inflevels: &[f64],
) -> Result<()> {
    let dataset = load_dataset(input)?;
    let bitinfo = bitinformation(&dataset, estimator.dim.as_deref(), &estimator.config())?;

    eprintln!(
        "Rounding {} slab(s) along '{}' with inflevels {:?}...",
        inflevels.len(),
        along,
        inflevels
    );
    let rounded = bitround_along_dim(&dataset, &bitinfo, along, inflevels)?;

    rounded.to_json_file(output)?;
    eprintln!("Wrote rounded dataset to {:?}", output);
    Ok(())
}

/// Run a pipeline from configuration
fn cmd_run(config_path: &Path, input: &Path, output: &Path, report: Option<&Path>) -> Result<()> {
    eprintln!("Loading pipeline configuration from {:?}...", config_path);
    let config = PipelineConfig::from_yaml_file(config_path)?;

    let dataset = load_dataset(input)?;

    eprintln!("Running pipeline '{}'...", config.name);
    let result = Pipeline::from_config(&config).run(&dataset)?;

    eprintln!();
    eprintln!("{}", result.bitinfo);
    eprintln!("Keepbits at inflevel {}: {}", config.inflevel, result.keepbits);

    result.rounded.to_json_file(output)?;
    eprintln!("Wrote rounded dataset to {:?}", output);

    if let Some(path) = report {
        std::fs::write(path, result.bitinfo.to_json()?)?;
        eprintln!("Wrote information profiles to {:?}", path);
    }
    Ok(())
}

/// Write a synthetic dataset
fn cmd_synthesize(
    output: &Path,
    preset: Preset,
    shape: Option<&[usize]>,
    double: bool,
    noise: Option<f64>,
    seed: u64,
) -> Result<()> {
    let mut config = match preset {
        Preset::Default => SyntheticConfig::default(),
        Preset::Smooth => SyntheticConfig::smooth(),
        Preset::Noisy => SyntheticConfig::noisy(),
        Preset::GappyDouble => SyntheticConfig::gappy_double(),
    }
    .with_seed(seed);

    if let Some(&[t, lat, lon]) = shape {
        config = config.with_dimensions(t, lat, lon);
    }
    if double {
        config = config.with_precision(Precision::Float64);
    }
    if let Some(noise) = noise {
        config = config.with_noise(noise);
    }

    eprintln!(
        "Generating '{}' ({}x{}x{}, noise {})...",
        config.name, config.n_time, config.n_lat, config.n_lon, config.noise
    );
    let dataset = generate_synthetic(&config)?;
    dataset.to_json_file(output)?;
    eprintln!("Wrote synthetic dataset to {:?}", output);
    Ok(())
}

/// Write an example pipeline configuration
fn cmd_example(output_path: &Path) -> Result<()> {
    let pipeline = Pipeline::new()
        .name("example-bitround")
        .dim("lon")
        .inflevel(0.99)
        .confidence(0.99);

    let config = pipeline.to_config(Some(
        "Keep 99% of the real information along longitude and round the rest away",
    ));
    let yaml = config.to_yaml()?;

    std::fs::write(output_path, &yaml)?;
    eprintln!("Wrote example pipeline to {:?}", output_path);
    eprintln!();
    eprintln!("Contents:");
    println!("{}", yaml);

    Ok(())
}
