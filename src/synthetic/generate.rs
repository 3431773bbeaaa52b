//! Synthetic data generation.

use crate::data::{Dataset, FloatArray, Variable};
use crate::error::{BitinfoError, Result};
use ndarray::{Array, ArrayD, IxDyn};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Element type of generated variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Float32,
    Float64,
}

/// Configuration for synthetic data generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Name/identifier for this dataset.
    pub name: String,
    /// Number of time steps.
    pub n_time: usize,
    /// Number of latitudes.
    pub n_lat: usize,
    /// Number of longitudes.
    pub n_lon: usize,
    pub precision: Precision,
    /// Standard deviation of the white noise added to the smooth fields,
    /// relative to each field's amplitude.
    pub noise: f64,
    /// Proportion of missing (NaN) values, 0.0-1.0.
    pub missing_fraction: f64,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            name: "synthetic".to_string(),
            n_time: 4,
            n_lat: 32,
            n_lon: 64,
            precision: Precision::Float32,
            noise: 1e-3,
            missing_fraction: 0.0,
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Create a new config with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Set the grid size.
    pub fn with_dimensions(mut self, n_time: usize, n_lat: usize, n_lon: usize) -> Self {
        self.n_time = n_time;
        self.n_lat = n_lat;
        self.n_lon = n_lon;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set the relative noise level.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise.max(0.0);
        self
    }

    /// Set the proportion of missing values.
    pub fn with_missing(mut self, fraction: f64) -> Self {
        self.missing_fraction = fraction.clamp(0.0, 0.99);
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // Preset configurations

    /// Noise-free fields: information reaches deep into the mantissa.
    pub fn smooth() -> Self {
        Self::new("smooth").with_noise(0.0)
    }

    /// Fields dominated by noise: little real information.
    pub fn noisy() -> Self {
        Self::new("noisy").with_noise(0.5)
    }

    /// Double precision fields with a sprinkling of missing values.
    pub fn gappy_double() -> Self {
        Self::new("gappy_double")
            .with_precision(Precision::Float64)
            .with_missing(0.05)
    }

    fn validate(&self) -> Result<()> {
        if self.n_time == 0 || self.n_lat == 0 || self.n_lon == 0 {
            return Err(BitinfoError::InvalidParameter(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                self.n_time, self.n_lat, self.n_lon
            )));
        }
        if !self.noise.is_finite() {
            return Err(BitinfoError::InvalidParameter(format!(
                "noise must be finite, got {}",
                self.noise
            )));
        }
        Ok(())
    }
}

/// Generate a dataset with variables `temperature`, `pressure` and
/// `humidity` on a (time, lat, lon) grid.
pub fn generate_synthetic(config: &SyntheticConfig) -> Result<Dataset> {
    config.validate()?;
    let mut rng = Rng::new(config.seed);
    let shape = IxDyn(&[config.n_time, config.n_lat, config.n_lon]);
    let dims: Vec<String> = ["time", "lat", "lon"].iter().map(|d| d.to_string()).collect();

    let coords = |ix: &IxDyn| {
        let t = ix[0] as f64 / config.n_time as f64;
        let lat = PI * (ix[1] as f64 + 0.5) / config.n_lat as f64 - PI / 2.0;
        let lon = 2.0 * PI * ix[2] as f64 / config.n_lon as f64;
        (t, lat, lon)
    };

    // Kelvin, equator-to-pole gradient plus a travelling wave
    let temperature = field(&mut rng, config, shape.clone(), 20.0, |ix| {
        let (t, lat, lon) = coords(ix);
        255.0 + 40.0 * lat.cos() + 5.0 * (3.0 * lon + 2.0 * PI * t).sin()
    });
    // Pascal
    let pressure = field(&mut rng, config, shape.clone(), 2000.0, |ix| {
        let (t, lat, lon) = coords(ix);
        101_325.0 + 1500.0 * (2.0 * lat).sin() * (lon - 2.0 * PI * t).cos()
    });
    // Dimensionless, in (0, 1)
    let humidity = field(&mut rng, config, shape, 0.2, |ix| {
        let (t, lat, lon) = coords(ix);
        (0.5 + 0.3 * lat.cos() * (2.0 * lon + PI * t).sin()).clamp(0.01, 0.99)
    });

    let variables = [
        ("temperature", temperature, "K"),
        ("pressure", pressure, "Pa"),
        ("humidity", humidity, "1"),
    ]
    .into_iter()
    .map(|(name, data, units)| {
        let data = match config.precision {
            Precision::Float32 => FloatArray::F32(data.mapv(|x| x as f32)),
            Precision::Float64 => FloatArray::F64(data),
        };
        Ok(Variable::new(name, dims.clone(), data)?.with_attr("units", units))
    })
    .collect::<Result<Vec<_>>>()?;

    Dataset::new(variables)
}

/// Evaluate `base` on the grid, add noise of `noise * scale` standard
/// deviation and punch holes for missing values.
fn field<F>(rng: &mut Rng, config: &SyntheticConfig, shape: IxDyn, scale: f64, base: F) -> ArrayD<f64>
where
    F: Fn(&IxDyn) -> f64,
{
    let mut data = Array::from_shape_fn(shape, |ix| base(&ix));
    for x in data.iter_mut() {
        if config.noise > 0.0 {
            *x = rng.next_normal(*x, config.noise * scale);
        }
        if config.missing_fraction > 0.0 && rng.next_f64() < config.missing_fraction {
            *x = f64::NAN;
        }
    }
    data
}

/// Simple deterministic RNG (xorshift64).
struct Rng {
    state: u64,
}

impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() as f64) / (u64::MAX as f64)
    }

    /// Generate a value from approximate normal distribution (Box-Muller).
    fn next_normal(&mut self, mean: f64, std: f64) -> f64 {
        let u1 = self.next_f64().max(1e-10);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        mean + std * z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{bitinformation, InformationConfig};
    use crate::keepbits::get_keepbits;

    #[test]
    fn test_default_config() {
        let config = SyntheticConfig::default();
        assert_eq!((config.n_time, config.n_lat, config.n_lon), (4, 32, 64));
        assert_eq!(config.precision, Precision::Float32);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(SyntheticConfig::smooth().noise, 0.0);
        assert!(SyntheticConfig::noisy().noise > 0.1);
        let gappy = SyntheticConfig::gappy_double();
        assert_eq!(gappy.precision, Precision::Float64);
        assert!(gappy.missing_fraction > 0.0);
    }

    #[test]
    fn test_generate_synthetic() {
        let config = SyntheticConfig::new("test").with_dimensions(2, 8, 16);
        let ds = generate_synthetic(&config).unwrap();
        assert_eq!(ds.names(), vec!["temperature", "pressure", "humidity"]);
        for v in ds.iter() {
            assert_eq!(v.shape(), &[2, 8, 16]);
            assert_eq!(v.dims(), &["time", "lat", "lon"]);
            assert_eq!(v.data().dtype(), "float32");
            assert!(v.attrs().contains_key("units"));
        }
    }

    #[test]
    fn test_deterministic_generation() {
        let config = SyntheticConfig::new("test").with_seed(999).with_missing(0.1);
        let a = generate_synthetic(&config).unwrap();
        let b = generate_synthetic(&config).unwrap();
        let bits = |ds: &Dataset| -> Vec<u64> {
            ds.get("pressure")
                .unwrap()
                .data()
                .to_f64_vec()
                .iter()
                .map(|x| x.to_bits())
                .collect()
        };
        assert_eq!(bits(&a), bits(&b));

        let c = generate_synthetic(&config.clone().with_seed(1000)).unwrap();
        assert_ne!(bits(&a), bits(&c));
    }

    #[test]
    fn test_missing_fraction() {
        let config = SyntheticConfig::gappy_double().with_dimensions(4, 50, 50);
        let ds = generate_synthetic(&config).unwrap();
        let values = ds.get("temperature").unwrap().data().to_f64_vec();
        let missing = values.iter().filter(|x| x.is_nan()).count() as f64 / values.len() as f64;
        assert!(missing > 0.03 && missing < 0.07);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let config = SyntheticConfig::new("empty").with_dimensions(0, 4, 4);
        assert!(matches!(
            generate_synthetic(&config),
            Err(BitinfoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_noise_reduces_keepbits() {
        let config = InformationConfig::default();
        let smooth = generate_synthetic(&SyntheticConfig::smooth()).unwrap();
        let noisy = generate_synthetic(&SyntheticConfig::noisy()).unwrap();
        let k_smooth = get_keepbits(&bitinformation(&smooth, Some("lon"), &config).unwrap(), 0.99)
            .unwrap()
            .resolve("temperature", crate::data::FloatFormat::SINGLE)
            .unwrap();
        let k_noisy = get_keepbits(&bitinformation(&noisy, Some("lon"), &config).unwrap(), 0.99)
            .unwrap()
            .resolve("temperature", crate::data::FloatFormat::SINGLE)
            .unwrap();
        assert!(k_noisy < k_smooth);
    }
}
