pub mod app_config;
pub mod cache;
pub mod category;
pub mod config;
pub mod deals;
pub mod sources;
pub mod stores;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cache::DealsCache;
pub use category::{categorize, Category};
pub use config::{load_app_config, load_app_config_from_env};
pub use deals::Deal;
pub use sources::{load_sources, SelectorSet, SourceConfig, SourcesFile, Strategy};
pub use stores::normalize_store_name;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Validation(String),
}
