use crate::core::upload::DEFAULT_LOOKUP_BATCH_SIZE;
use crate::domain::ports::{ConfigProvider, TableNames};
use crate::utils::error::{LedgerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "poultry-ledger.toml";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub store: StoreConfig,
    pub farm: FarmConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub tables: TableNames,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmConfig {
    pub farm_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadConfig {
    pub lookup_batch_size: Option<usize>,
}

impl LedgerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LedgerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` with the environment value; unset variables are left
    /// in place and caught by validation.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LedgerError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("store.endpoint", &self.store.endpoint)?;

        if let Some(api_key) = &self.store.api_key {
            validation::validate_non_empty_string("store.api_key", api_key)?;
            if api_key.contains("${") {
                return Err(LedgerError::InvalidConfigValueError {
                    field: "store.api_key".to_string(),
                    value: api_key.clone(),
                    reason: "environment variable is not set".to_string(),
                });
            }
        }

        if let Some(timeout) = self.store.timeout_seconds {
            validation::validate_range("store.timeout_seconds", timeout, 1, 300)?;
        }

        validation::validate_non_empty_string("farm.farm_id", &self.farm.farm_id)?;

        if let Some(batch) = self.upload.lookup_batch_size {
            validation::validate_positive_number("upload.lookup_batch_size", batch, 1)?;
            validation::validate_range("upload.lookup_batch_size", batch, 1, 1000)?;
        }

        for (field, name) in [
            ("tables.chickens", &self.tables.chickens),
            ("tables.weights", &self.tables.weights),
            ("tables.standards", &self.tables.standards),
        ] {
            validation::validate_non_empty_string(field, name)?;
        }

        Ok(())
    }
}

impl ConfigProvider for LedgerConfig {
    fn store_endpoint(&self) -> &str {
        &self.store.endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.store.api_key.as_deref()
    }

    fn farm_id(&self) -> &str {
        &self.farm.farm_id
    }

    fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn lookup_batch_size(&self) -> usize {
        self.upload
            .lookup_batch_size
            .unwrap_or(DEFAULT_LOOKUP_BATCH_SIZE)
    }

    fn request_timeout_secs(&self) -> u64 {
        self.store.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for LedgerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
