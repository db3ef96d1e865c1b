use anyhow::Context;
use clap::Parser;
use poultry_ledger::core::tracking::WeightHistory;
use poultry_ledger::core::upload::TEMPLATE_CSV;
use poultry_ledger::core::{ConfigProvider, Storage};
use poultry_ledger::utils::error::ErrorSeverity;
use poultry_ledger::utils::{logger, validation};
use poultry_ledger::utils::validation::Validate;
use poultry_ledger::{
    BulkUploader, CliConfig, Command, FarmScope, LedgerConfig, LedgerError, LocalStorage,
    RestRowStore, UploadResult, WeightTracker,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting poultry-ledger");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if !cli.needs_store() {
        if let Command::Template { output } = &cli.command {
            if let Err(e) = write_template(output).await {
                fail(&e);
            }
        }
        return Ok(());
    }

    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let mut config = LedgerConfig::from_file(&cli.config)
        .with_context(|| format!("Failed to load config file '{}'", cli.config))?;
    cli.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        fail(&e);
    }

    if let Err(e) = run(&cli, &config).await {
        fail(&e);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: &LedgerConfig) -> poultry_ledger::Result<()> {
    let store = RestRowStore::from_config(config)?;
    let scope = FarmScope::new(config.farm_id());

    match &cli.command {
        Command::Upload { file, json } => {
            validation::validate_file_extension("file", file, &["csv"])?;

            let data = LocalStorage::new(".").read_file(file).await?;
            let text = String::from_utf8(data).map_err(|e| LedgerError::ValidationError {
                message: format!("{} is not valid UTF-8: {}", file, e),
            })?;

            let uploader = BulkUploader::from_config(store, config);
            let result = uploader.upload(&scope, &text).await?;
            print_upload(&result, *json)?;
        }
        Command::History { chicken_id, json } => {
            let tracker = WeightTracker::from_config(store, config);
            let today = chrono::Local::now().date_naive();
            let history = tracker.history(&scope, *chicken_id, today).await?;
            print_history(&history, *json)?;
        }
        Command::Record {
            chicken_id,
            date,
            weight,
        } => {
            let uploader = BulkUploader::from_config(store, config);
            let record = uploader.record_weight(&scope, chicken_id, date, weight).await?;
            println!(
                "✅ Recorded {} kg for chicken {} on {}",
                record.weight_kg, record.chicken_id, record.date_recorded
            );
        }
        Command::Classify { weight, age } => {
            let tracker = WeightTracker::from_config(store, config);
            let standards = tracker.load_standards().await?;
            let classification = standards.classify(*weight, *age);
            match classification.expected_weight_kg {
                Some(expected) => println!(
                    "{} kg at {} days: {} (expected {} kg)",
                    weight, age, classification.status, expected
                ),
                None => println!(
                    "{} kg at {} days: {} (no weight standards on file)",
                    weight, age, classification.status
                ),
            }
        }
        Command::Template { output } => write_template(output).await?,
    }

    Ok(())
}

async fn write_template(output: &str) -> poultry_ledger::Result<()> {
    validation::validate_path("output", output)?;
    LocalStorage::new(".")
        .write_file(output, TEMPLATE_CSV.as_bytes())
        .await?;
    println!("📁 Template saved to: {}", output);
    Ok(())
}

fn print_upload(result: &UploadResult, json: bool) -> poultry_ledger::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("✅ Successful: {}", result.success_count);
    println!("❌ Errors:     {}", result.error_count());
    println!("📄 Total rows: {}", result.total_rows);
    for error in &result.errors {
        println!("   {}", error);
    }
    Ok(())
}

fn print_history(history: &WeightHistory, json: bool) -> poultry_ledger::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(history)?);
        return Ok(());
    }

    let age = history
        .current_age_in_days
        .map(|days| format!("{} days", days))
        .unwrap_or_else(|| "unknown age".to_string());
    println!(
        "Chicken {} ({}, {}) - {} weight records",
        history.chicken.id,
        history.chicken.breed,
        age,
        history.entries.len()
    );

    println!("{:<12} {:>10} {:>14} {:>12}", "Date", "Weight", "Expected", "Status");
    for entry in &history.entries {
        let expected = entry
            .classification
            .expected_weight_kg
            .map(|kg| format!("{} kg", kg))
            .unwrap_or_else(|| "N/A".to_string());
        println!(
            "{:<12} {:>10} {:>14} {:>12}",
            entry.record.date_recorded.to_string(),
            format!("{} kg", entry.record.weight_kg),
            expected,
            entry.classification.status.to_string()
        );
    }
    Ok(())
}

fn fail(e: &LedgerError) -> ! {
    tracing::error!(
        "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,      // 輸入錯誤
        ErrorSeverity::Medium => 2,   // 可重試
        ErrorSeverity::High => 1,     // 設定或資料庫錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}
