use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures surfaced to callers. A tick itself never fails; only malformed
/// operator calls and configuration loading do.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown cognitive basis: {0:?}")]
    UnknownBasis(String),
    #[error("failed to read {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML {path:?}: {source}")]
    ConfigToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {name}: {value:?}")]
    ConfigEnv { name: &'static str, value: String },
    #[error("malformed tick input: {0}")]
    Input(#[from] serde_json::Error),
}
