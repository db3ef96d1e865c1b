use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Row store request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid CSV format. Expected headers: {expected}")]
    InvalidHeaderError { expected: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Chicken ID {chicken_id} not found")]
    ChickenNotFound { chicken_id: i64 },

    #[error("Duplicate rows rejected by {table}: {message}")]
    ConflictError { table: String, message: String },

    #[error("Row store error on {table} ({status}): {message}")]
    StoreError {
        table: String,
        status: u16,
        code: Option<String>,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Storage,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::ConfigError { .. }
            | LedgerError::ConfigValidationError { .. }
            | LedgerError::MissingConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LedgerError::CsvError(_)
            | LedgerError::InvalidHeaderError { .. }
            | LedgerError::ValidationError { .. }
            | LedgerError::ChickenNotFound { .. } => ErrorCategory::Input,
            LedgerError::ConflictError { .. } | LedgerError::StoreError { .. } => {
                ErrorCategory::Storage
            }
            LedgerError::HttpError(_) => ErrorCategory::Network,
            LedgerError::IoError(_) | LedgerError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Storage => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Whether the row store reported a uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LedgerError::ConflictError { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LedgerError::HttpError(_) => "Could not reach the farm database".to_string(),
            LedgerError::StoreError { message, .. } => format!("Database error: {}", message),
            LedgerError::ConflictError { .. } => {
                "A weight record already exists for this chicken and date".to_string()
            }
            LedgerError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LedgerError::HttpError(_) => "Check the store endpoint and your network connection",
            LedgerError::StoreError { status: 401 | 403, .. } => {
                "Check the store api_key and the table permissions for this farm"
            }
            LedgerError::StoreError { .. } => "Check the table names in the [tables] section",
            LedgerError::ConflictError { .. } => {
                "Remove rows that were already recorded and upload again"
            }
            LedgerError::InvalidHeaderError { .. } => {
                "Download the template and keep its header line"
            }
            LedgerError::ChickenNotFound { .. } => {
                "Make sure the chicken belongs to the selected farm"
            }
            LedgerError::ValidationError { .. } | LedgerError::CsvError(_) => {
                "Fix the input values and try again"
            }
            LedgerError::ConfigError { .. }
            | LedgerError::ConfigValidationError { .. }
            | LedgerError::MissingConfigError { .. }
            | LedgerError::InvalidConfigValueError { .. } => {
                "Review the configuration file and command line flags"
            }
            LedgerError::IoError(_) => "Check that the file exists and is readable",
            LedgerError::SerializationError(_) => "The database returned data in an unexpected shape",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
