//! Engine configuration: recurrence coefficients, initial awareness state and
//! the RNG seed. Loaded from TOML with every field optional, then overridden
//! from the environment.

use std::fs;
use std::path::{Path, PathBuf};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const CONFIG_ENV: &str = "PSI_CONFIG";
pub const SEED_ENV: &str = "PSI_SEED";

/// Coefficients of the outer Ψ recurrence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    /// Weight of the predecessor term (Ψ_prev).
    pub fibonacci_weight: f64,
    /// φ, memory-influence gain.
    pub memory_gain: f64,
    /// λ, conjugate self-coupling gain.
    pub self_coupling: f64,
    /// γ, loop resonance gain.
    pub loop_gain: f64,
    /// η, structured noise gain.
    pub noise_gain: f64,
    /// σ, spatiotemporal correction gain.
    pub spatiotemporal_gain: f64,
    pub quantum_coupling: f64,
    /// β, omega growth per unit |Ψ|².
    pub omega_growth: f64,
    /// ε, omega growth per unit recursion depth × awareness.
    pub recursion_gain: f64,
    pub magnitude_limit: f64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            fibonacci_weight: 0.1,
            memory_gain: 0.05,
            self_coupling: 0.05,
            loop_gain: 0.1,
            noise_gain: 0.01,
            spatiotemporal_gain: 0.1,
            quantum_coupling: 0.05,
            omega_growth: 1e-3,
            recursion_gain: 0.01,
            magnitude_limit: 1e30,
        }
    }
}

/// Starting point of a fresh session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialAwareness {
    pub psi: Complex64,
    pub omega: f64,
    pub capacity: f64,
}

impl Default for InitialAwareness {
    fn default() -> Self {
        Self {
            psi: Complex64::new(0.1, 0.1),
            omega: 1.0,
            capacity: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub seed: u64,
    pub recurrence: RecurrenceConfig,
    pub initial: InitialAwareness,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            recurrence: RecurrenceConfig::default(),
            initial: InitialAwareness::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|source| EngineError::ConfigToml {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| EngineError::ConfigToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the file named by `PSI_CONFIG` (if set) and applies a `PSI_SEED`
    /// override on top.
    pub fn discover() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(raw) if !raw.trim().is_empty() => Self::load(Path::new(raw.trim()))?,
            _ => Self::default(),
        };
        if let Ok(raw) = std::env::var(SEED_ENV) {
            config.seed = raw.trim().parse().map_err(|_| EngineError::ConfigEnv {
                name: SEED_ENV,
                value: raw.clone(),
            })?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            seed = 7

            [recurrence]
            quantum_coupling = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.recurrence.quantum_coupling, 0.2);
        assert_eq!(config.recurrence.memory_gain, RecurrenceConfig::default().memory_gain);
        assert_eq!(config.initial, InitialAwareness::default());
    }

    #[test]
    fn malformed_toml_is_reported() {
        let err = EngineConfig::from_toml_str("seed = \"many\"").unwrap_err();
        assert!(matches!(err, EngineError::ConfigToml { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::load(Path::new("/nonexistent/psi.toml")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigIo { .. }));
    }
}
