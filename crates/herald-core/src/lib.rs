//! Shared domain types and process configuration for podherald.

pub mod app_config;
pub mod config;
pub mod cursor;
pub mod episode;

use thiserror::Error;

pub use app_config::{AppConfig, StateLocation};
pub use config::{load_app_config, load_app_config_from_env};
pub use cursor::Cursor;
pub use episode::{CandidateEpisode, CanonicalEpisode, PlatformMatch};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
