use thiserror::Error;

mod app_config;
mod config;
pub mod vendors;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use vendors::{load_vendors, VendorConfig, VendorsFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read vendor catalog at {path}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse vendor catalog: {0}")]
    CatalogParse(#[from] serde_yaml::Error),
    #[error("invalid vendor catalog: {0}")]
    Validation(String),
}
