#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use poultry_ledger::config::lambda::{LambdaConfig, S3Storage};
#[cfg(feature = "lambda")]
use poultry_ledger::core::{ConfigProvider, Storage};
#[cfg(feature = "lambda")]
use poultry_ledger::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use poultry_ledger::{BulkUploader, FarmScope, LedgerError, RestRowStore, UploadResult};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub bucket: Option<String>,
    pub key: String,
    pub farm_id: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub result_key: String,
    pub upload: UploadResult,
}

#[cfg(feature = "lambda")]
fn boxed(e: LedgerError) -> Error {
    tracing::error!("❌ {} (Category: {:?})", e, e.category());
    Box::new(e)
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting weight upload for {}", event.payload.key);

    let mut lambda_config = LambdaConfig::from_env().map_err(boxed)?;
    if let Some(bucket) = &event.payload.bucket {
        lambda_config.s3_bucket = bucket.clone();
    }
    if let Some(farm_id) = &event.payload.farm_id {
        lambda_config.farm_id = farm_id.clone();
    }
    lambda_config.validate().map_err(boxed)?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(lambda_config.s3_region.clone()))
        .force_path_style(true)
        .build();
    let storage = S3Storage::new(S3Client::from_conf(s3_config), lambda_config.s3_bucket.clone());

    let data = storage.read_file(&event.payload.key).await.map_err(boxed)?;
    let text = String::from_utf8(data).map_err(|e| {
        boxed(LedgerError::ValidationError {
            message: format!("{} is not valid UTF-8: {}", event.payload.key, e),
        })
    })?;

    let store = RestRowStore::from_config(&lambda_config).map_err(boxed)?;
    let scope = FarmScope::new(lambda_config.farm_id());
    let uploader = BulkUploader::from_config(store, &lambda_config);
    let upload = uploader.upload(&scope, &text).await.map_err(boxed)?;

    let result_key = format!("{}.result.json", event.payload.key);
    let body = serde_json::to_vec_pretty(&upload).map_err(|e| boxed(e.into()))?;
    storage.write_file(&result_key, &body).await.map_err(boxed)?;

    tracing::info!(
        "Weight upload finished: {} inserted, {} errors",
        upload.success_count,
        upload.error_count()
    );

    Ok(Response {
        message: format!(
            "Uploaded {} of {} weight records",
            upload.success_count, upload.total_rows
        ),
        result_key,
        upload,
    })
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
