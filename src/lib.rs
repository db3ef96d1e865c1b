pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, toml_config::LedgerConfig};

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

#[cfg(feature = "lambda")]
pub use config::lambda::{LambdaConfig, S3Storage};

pub use adapters::{InMemoryRowStore, RestRowStore};
pub use core::{
    classifier::WeightStandards, tracking::WeightTracker, upload::BulkUploader, FarmScope,
};
pub use domain::model::{Classification, UploadResult, WeightStatus};
pub use utils::error::{LedgerError, Result};
