#[cfg(feature = "lambda")]
use crate::core::upload::DEFAULT_LOOKUP_BATCH_SIZE;
#[cfg(feature = "lambda")]
use crate::core::{ConfigProvider, Storage, TableNames};
#[cfg(feature = "lambda")]
use crate::utils::error::{LedgerError, Result};
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use std::env;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub store_endpoint: String,
    pub api_key: Option<String>,
    pub farm_id: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub tables: TableNames,
    pub lookup_batch_size: usize,
    pub request_timeout_secs: u64,
}

#[cfg(feature = "lambda")]
fn required_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| LedgerError::MissingConfigError {
        field: name.to_string(),
    })
}

#[cfg(feature = "lambda")]
fn numeric_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "expected a whole number".to_string(),
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = TableNames::default();

        Ok(Self {
            store_endpoint: required_env("STORE_ENDPOINT")?,
            api_key: env::var("STORE_API_KEY").ok(),
            farm_id: required_env("FARM_ID")?,
            s3_bucket: required_env("S3_BUCKET")?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "ap-southeast-2".to_string()),
            tables: TableNames {
                chickens: env::var("CHICKENS_TABLE").unwrap_or(defaults.chickens),
                weights: env::var("WEIGHTS_TABLE").unwrap_or(defaults.weights),
                standards: env::var("STANDARDS_TABLE").unwrap_or(defaults.standards),
            },
            lookup_batch_size: numeric_env("LOOKUP_BATCH_SIZE", DEFAULT_LOOKUP_BATCH_SIZE)?,
            request_timeout_secs: numeric_env(
                "REQUEST_TIMEOUT_SECONDS",
                crate::config::toml_config::DEFAULT_TIMEOUT_SECONDS,
            )?,
        })
    }
}

#[cfg(feature = "lambda")]
impl ConfigProvider for LambdaConfig {
    fn store_endpoint(&self) -> &str {
        &self.store_endpoint
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn farm_id(&self) -> &str {
        &self.farm_id
    }

    fn tables(&self) -> &TableNames {
        &self.tables
    }

    fn lookup_batch_size(&self) -> usize {
        self.lookup_batch_size
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_url("STORE_ENDPOINT", &self.store_endpoint)?;
        validate_non_empty_string("FARM_ID", &self.farm_id)?;
        validate_s3_bucket_name("S3_BUCKET", &self.s3_bucket)?;
        validate_aws_region("S3_REGION", &self.s3_region)?;
        validate_range("LOOKUP_BATCH_SIZE", self.lookup_batch_size, 1, 1000)?;
        validate_range("REQUEST_TIMEOUT_SECONDS", self.request_timeout_secs, 1, 300)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "lambda")]
fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    let reason = if bucket_name.len() < 3 || bucket_name.len() > 63 {
        Some("S3 bucket name must be between 3 and 63 characters")
    } else if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        Some("S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots")
    } else if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        Some("S3 bucket name cannot start or end with a hyphen")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

#[cfg(feature = "lambda")]
fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    crate::utils::validation::validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(LedgerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

/// Upload sources and result files in one S3 bucket.
#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

#[cfg(feature = "lambda")]
impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[cfg(feature = "lambda")]
impl Storage for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| LedgerError::ConfigError {
                message: format!("Failed to read s3://{}/{}: {}", self.bucket, path, e),
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| LedgerError::ConfigError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type("application/json")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| LedgerError::ConfigError {
                message: format!("Failed to write s3://{}/{}: {}", self.bucket, path, e),
            })?;

        Ok(())
    }
}

#[cfg(all(test, feature = "lambda"))]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_names() {
        assert!(validate_s3_bucket_name("S3_BUCKET", "farm-uploads").is_ok());
        assert!(validate_s3_bucket_name("S3_BUCKET", "Farm_Uploads").is_err());
        assert!(validate_s3_bucket_name("S3_BUCKET", "-uploads").is_err());
        assert!(validate_s3_bucket_name("S3_BUCKET", "ab").is_err());
    }

    #[test]
    fn test_regions() {
        assert!(validate_aws_region("S3_REGION", "ap-southeast-2").is_ok());
        assert!(validate_aws_region("S3_REGION", "AP_SOUTHEAST").is_err());
    }
}
