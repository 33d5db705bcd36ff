use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cannot read spreadsheet '{locator}': {message}")]
    SourceError { locator: String, message: String },

    #[error("Unsupported spreadsheet source '{locator}'")]
    UnsupportedSource { locator: String },

    #[error("Product '{code}' already exists")]
    DuplicateProduct { code: String },

    #[error("Product store error: {message}")]
    StoreError { message: String },

    #[error("Failed to dispatch image processing for '{product_code}': {message}")]
    DispatchError {
        product_code: String,
        message: String,
    },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Source,
    Store,
    Dispatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::CsvError(_)
            | ImportError::IoError(_)
            | ImportError::SourceError { .. }
            | ImportError::UnsupportedSource { .. } => ErrorCategory::Source,
            ImportError::SerializationError(_)
            | ImportError::DuplicateProduct { .. }
            | ImportError::StoreError { .. } => ErrorCategory::Store,
            ImportError::HttpError(_) | ImportError::DispatchError { .. } => {
                ErrorCategory::Dispatch
            }
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Source => ErrorSeverity::Medium,
            ErrorCategory::Store | ErrorCategory::Dispatch => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::UnsupportedSource { .. } => {
                "Provide a .csv or .json spreadsheet export"
            }
            ImportError::CsvError(_) | ImportError::SourceError { .. } => {
                "Check that the file is a well-formed export with a header row"
            }
            ImportError::IoError(_) => "Check that the file exists and is readable",
            ImportError::SerializationError(_) | ImportError::StoreError { .. } => {
                "Check the product store file; it may be corrupt or not writable"
            }
            ImportError::DuplicateProduct { .. } => {
                "Another import may be running against the same store"
            }
            ImportError::HttpError(_) | ImportError::DispatchError { .. } => {
                "Check the dispatch endpoint; products created before the failure were kept"
            }
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => {
                "Fix the configuration file or command-line overrides"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Source => format!("Could not read the spreadsheet: {}", self),
            ErrorCategory::Store => format!("Could not save products: {}", self),
            ErrorCategory::Dispatch => format!("Could not queue image processing: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
