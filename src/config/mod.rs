pub mod cli;
pub mod lambda;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::upload::TEMPLATE_FILE_NAME;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::{LedgerConfig, DEFAULT_CONFIG_FILE};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "poultry-ledger")]
#[command(about = "Chicken weight uploads and weight tracking for poultry farms")]
pub struct CliConfig {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Override the farm from the configuration file
    #[arg(long)]
    pub farm_id: Option<String>,

    /// Override the row store endpoint from the configuration file
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import chicken weights from a CSV file
    ///
    /// Blank lines anywhere in the file are ignored and not counted as rows.
    Upload {
        file: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the CSV upload template
    Template {
        #[arg(short, long, default_value = TEMPLATE_FILE_NAME)]
        output: String,
    },
    /// Show the weight history of one chicken
    History {
        chicken_id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Record a single weight
    Record {
        #[arg(long)]
        chicken_id: String,
        /// Date in YYYY-MM-DD form
        #[arg(long)]
        date: String,
        #[arg(long)]
        weight: String,
    },
    /// Classify a weight against the weight standards
    Classify {
        #[arg(long)]
        weight: f64,
        #[arg(long)]
        age: i64,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Whether the command talks to the row store at all.
    pub fn needs_store(&self) -> bool {
        !matches!(self.command, Command::Template { .. })
    }

    /// 應用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut LedgerConfig) {
        if let Some(farm_id) = &self.farm_id {
            tracing::info!("🔧 Farm overridden to: {}", farm_id);
            config.farm.farm_id = farm_id.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            tracing::info!("🔧 Store endpoint overridden to: {}", endpoint);
            config.store.endpoint = endpoint.clone();
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[store]
endpoint = "https://farm.supabase.co/rest/v1"

[farm]
farm_id = "farm-a"
"#;

    #[test]
    fn test_parse_upload_command() {
        let cli = CliConfig::parse_from(["poultry-ledger", "--farm-id", "farm-b", "upload", "weights.csv", "--json"]);

        assert_eq!(cli.config, DEFAULT_CONFIG_FILE);
        assert!(cli.needs_store());
        match cli.command {
            Command::Upload { ref file, json } => {
                assert_eq!(file, "weights.csv");
                assert!(json);
            }
            ref other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_template_does_not_need_store() {
        let cli = CliConfig::parse_from(["poultry-ledger", "template"]);
        assert!(!cli.needs_store());
        assert!(matches!(cli.command, Command::Template { ref output } if output == TEMPLATE_FILE_NAME));
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = CliConfig::parse_from([
            "poultry-ledger",
            "--farm-id",
            "farm-b",
            "--endpoint",
            "http://localhost:3000",
            "classify",
            "--weight",
            "2.1",
            "--age",
            "30",
        ]);
        let mut config = LedgerConfig::from_toml_str(CONFIG).unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.farm.farm_id, "farm-b");
        assert_eq!(config.store.endpoint, "http://localhost:3000");
    }
}
