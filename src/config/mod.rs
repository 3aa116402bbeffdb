//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables (`CASCADE_*`)
//! - CLI arguments (applied by the binary on top of the above)
//!
//! # Example
//!
//! ```toml
//! [model]
//! n = 200
//! gamma = 0.5
//! psi = 0.1
//! timesteps = 100000
//!
//! [network]
//! k = 8
//! topology = "scale_free"
//!
//! [adaptation]
//! policy = "threshold"
//! phi = 0.01
//! omega = 0.01
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adaptation::AdaptationConfig;
use crate::error::{CascadeError, Result};
use crate::network::Topology;

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Population and round parameters
    #[serde(default)]
    pub model: ModelConfig,

    /// Initial network
    #[serde(default)]
    pub network: NetworkConfig,

    /// Adaptation policy
    #[serde(default)]
    pub adaptation: AdaptationConfig,

    /// Fitness trials
    #[serde(default)]
    pub fitness: FitnessConfig,

    /// Assortativity and ledger settings
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            CascadeError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| CascadeError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Default config file location (`<config dir>/infocascade/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("infocascade").join("config.toml"))
    }

    /// Load `path`, or the default file if it exists, then apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `CASCADE_*` environment variables
    pub fn with_env_overrides(mut self) -> Self {
        fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
            std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
        }

        // Model settings
        if let Some(n) = parsed("CASCADE_N") {
            self.model.n = n;
        }
        if let Some(gamma) = parsed("CASCADE_GAMMA") {
            self.model.gamma = gamma;
        }
        if let Some(psi) = parsed("CASCADE_PSI") {
            self.model.psi = psi;
        }
        if let Some(timesteps) = parsed("CASCADE_TIMESTEPS") {
            self.model.timesteps = timesteps;
        }
        if let Some(seed) = parsed("CASCADE_SEED") {
            self.model.seed = seed;
        }

        // Network settings
        if let Some(k) = parsed("CASCADE_K") {
            self.network.k = k;
        }
        if let Some(topology) = parsed("CASCADE_TOPOLOGY") {
            self.network.topology = topology;
        }
        if let Some(directed) = parsed("CASCADE_DIRECTED") {
            self.network.directed = directed;
        }

        // Diagnostics and fitness
        if let Some(alpha) = parsed("CASCADE_ALPHA") {
            self.diagnostics.alpha = alpha;
        }
        if let Some(trials) = parsed("CASCADE_FITNESS_TRIALS") {
            self.fitness.trials = trials;
        }

        self
    }

    /// Check every parameter range
    pub fn validate(&self) -> Result<()> {
        let m = &self.model;
        if m.n < 2 || m.n % 2 != 0 {
            return Err(CascadeError::OddPopulation(m.n));
        }
        check_gamma(m.gamma)?;
        check_psi(m.psi)?;
        if !(m.threshold_low.is_finite() && m.threshold_high.is_finite())
            || m.threshold_low >= m.threshold_high
        {
            return Err(CascadeError::InvalidParameter(format!(
                "threshold bounds must satisfy low < high, got [{}, {}]",
                m.threshold_low, m.threshold_high
            )));
        }
        if !m.stimulus_mean.is_finite() {
            return Err(CascadeError::InvalidParameter(
                "stimulus_mean must be finite".to_string(),
            ));
        }

        let net = &self.network;
        if net.topology != Topology::Complete {
            if net.k == 0 || net.k >= m.n {
                return Err(CascadeError::InvalidDegree(format!(
                    "mean degree k = {} must satisfy 0 < k < n = {}",
                    net.k, m.n
                )));
            }
            if !net.directed && net.k % 2 != 0 {
                return Err(CascadeError::InvalidDegree(format!(
                    "undirected {} networks need an even mean degree, got k = {}",
                    net.topology, net.k
                )));
            }
        }

        self.adaptation.validate()?;

        if let Some(gamma) = self.fitness.gamma {
            check_gamma(gamma)?;
        }
        if let Some(psi) = self.fitness.psi {
            check_psi(psi)?;
        }

        if !(0.0..=1.0).contains(&self.diagnostics.alpha) {
            return Err(CascadeError::InvalidParameter(format!(
                "alpha = {} must lie in [0, 1]",
                self.diagnostics.alpha
            )));
        }
        Ok(())
    }
}

fn check_gamma(gamma: f64) -> Result<()> {
    if (-1.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(CascadeError::InvalidCorrelation(gamma))
    }
}

fn check_psi(psi: f64) -> Result<()> {
    if psi > 0.0 && psi <= 1.0 {
        Ok(())
    } else {
        Err(CascadeError::InvalidParameter(format!(
            "sampling fraction psi = {psi} must lie in (0, 1]"
        )))
    }
}

/// Population and round parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Population size (even)
    pub n: usize,

    /// Correlation between the two information sources
    pub gamma: f64,

    /// Fraction of agents sampling the sources directly each round
    pub psi: f64,

    /// Rounds per replicate
    pub timesteps: usize,

    /// Base seed mixed into every replicate seed
    pub seed: u64,

    /// Lower threshold bound (exclusive when seeding)
    pub threshold_low: f64,

    /// Upper threshold bound
    pub threshold_high: f64,

    /// Mean of the bivariate normal stimulus draw
    pub stimulus_mean: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n: 200,
            gamma: 0.0,
            psi: 0.1,
            timesteps: 1_000_000,
            seed: 0,
            threshold_low: 0.0,
            threshold_high: 1.0,
            stimulus_mean: 0.0,
        }
    }
}

/// Initial network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Target mean degree
    pub k: usize,

    /// Generator
    pub topology: Topology,

    /// One-way ties
    pub directed: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            k: 8,
            topology: Topology::Random,
            directed: false,
        }
    }
}

/// Fitness-trial configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Cascades per assessment (0 disables assessment in replicates)
    pub trials: usize,

    /// Source correlation during trials (defaults to the model's)
    pub gamma: Option<f64>,

    /// Sampling fraction during trials (defaults to the model's)
    pub psi: Option<f64>,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            trials: 10_000,
            gamma: None,
            psi: None,
        }
    }
}

/// Diagnostics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// PageRank walk continuation probability for local assortativity
    pub alpha: f64,

    /// Rounds per tie-change / assortativity window (0 disables tracking)
    pub assort_interval: usize,

    /// Keep only the first and last `W` rounds of the cascade ledger
    pub ledger_window: Option<usize>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            assort_interval: 0,
            ledger_window: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.n, 200);
        assert_eq!(config.network.k, 8);
        assert_eq!(config.network.topology, Topology::Random);
        assert_eq!(config.adaptation, AdaptationConfig::Paired);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [model]
            n = 100
            gamma = -0.5
            psi = 0.2
            timesteps = 5000

            [network]
            k = 4
            topology = "scale_free"

            [adaptation]
            policy = "probabilistic"
            p = 0.25

            [diagnostics]
            assort_interval = 100
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.model.n, 100);
        assert_eq!(config.model.gamma, -0.5);
        assert_eq!(config.model.seed, 0);
        assert_eq!(config.network.topology, Topology::ScaleFree);
        assert!(!config.network.directed);
        assert_eq!(config.adaptation, AdaptationConfig::Probabilistic { p: 0.25 });
        assert_eq!(config.diagnostics.assort_interval, 100);
        assert_eq!(config.fitness.trials, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = Config::default();
        config.model.gamma = 0.75;
        config.adaptation = AdaptationConfig::Threshold {
            phi: 0.01,
            omega: 0.02,
        };
        config.fitness.psi = Some(0.3);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/infocascade.toml").unwrap_err();
        assert!(matches!(err, CascadeError::Config(_)));
    }

    #[test]
    fn test_validate_rejects() {
        let mut config = Config::default();
        config.model.n = 201;
        assert!(matches!(config.validate(), Err(CascadeError::OddPopulation(201))));

        let mut config = Config::default();
        config.model.gamma = 1.5;
        assert!(matches!(config.validate(), Err(CascadeError::InvalidCorrelation(_))));

        let mut config = Config::default();
        config.network.k = 5;
        assert!(matches!(config.validate(), Err(CascadeError::InvalidDegree(_))));
        config.network.directed = true;
        assert!(config.validate().is_ok());

        let mut config = Config::default();
        config.diagnostics.alpha = -0.1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.model.psi = 0.0;
        assert!(config.validate().is_err());
    }
}
