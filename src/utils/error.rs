use thiserror::Error;

/// Failures of the alternate (file based) loaders.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not decode {path} with any of the encodings tried ({tried})")]
    Undecodable { path: String, tried: String },

    #[error("CSV parsing error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Malformed spreadsheet {path}: {message}")]
    Spreadsheet { path: String, message: String },

    #[error("Column '{column}' is missing from {path}")]
    MissingColumn { path: String, column: String },
}

/// Failures while writing an export. Every variant names the format involved.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("{format} export failed writing '{destination}': {source}")]
    Io {
        format: String,
        destination: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{format} export failed while encoding: {message}")]
    Encode { format: String, message: String },
}

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Load error: {0}")]
    LoadError(#[from] LoadError),

    #[error("Export error: {0}")]
    ExportError(#[from] ExportError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AnalyzerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalyzerError::LoadError(_) => ErrorCategory::Input,
            AnalyzerError::ExportError(_)
            | AnalyzerError::IoError(_)
            | AnalyzerError::SerializationError(_) => ErrorCategory::Output,
            AnalyzerError::ConfigError { .. }
            | AnalyzerError::ConfigValidationError { .. }
            | AnalyzerError::InvalidConfigValueError { .. }
            | AnalyzerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AnalyzerError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 匯出失敗不影響已完成的分析
            AnalyzerError::ExportError(ExportError::UnsupportedFormat(_)) => ErrorSeverity::Low,
            AnalyzerError::ExportError(_) | AnalyzerError::SerializationError(_) => {
                ErrorSeverity::Medium
            }
            AnalyzerError::LoadError(_)
            | AnalyzerError::ProcessingError { .. }
            | AnalyzerError::ConfigError { .. }
            | AnalyzerError::ConfigValidationError { .. }
            | AnalyzerError::InvalidConfigValueError { .. }
            | AnalyzerError::MissingConfigError { .. } => ErrorSeverity::High,
            AnalyzerError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AnalyzerError::LoadError(LoadError::NotFound { path }) => {
                format!("Input file '{}' does not exist", path)
            }
            AnalyzerError::LoadError(LoadError::Undecodable { path, .. }) => {
                format!("Input file '{}' uses an unknown text encoding", path)
            }
            AnalyzerError::LoadError(e) => format!("Could not load district data: {}", e),
            AnalyzerError::ExportError(ExportError::UnsupportedFormat(format)) => {
                format!("Export format '{}' is not supported", format)
            }
            AnalyzerError::ExportError(e) => format!("Export did not complete: {}", e),
            AnalyzerError::IoError(e) => format!("File system error: {}", e),
            AnalyzerError::SerializationError(e) => format!("Could not encode output: {}", e),
            AnalyzerError::ConfigError { message } => format!("Configuration problem: {}", message),
            AnalyzerError::ConfigValidationError { field, message } => {
                format!("Configuration field '{}' is invalid: {}", field, message)
            }
            AnalyzerError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for '{}': {}", value, field, reason),
            AnalyzerError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            AnalyzerError::ProcessingError { message } => format!("Analysis failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and command line arguments"
            }
            ErrorCategory::Input => {
                "Verify the input path and that the file is a CSV or spreadsheet with the expected column headers"
            }
            ErrorCategory::Output => {
                "Check that the output directory exists and is writable, and that the format is one of csv, excel, json, geojson"
            }
            ErrorCategory::Processing => "Re-run with --verbose to see which records triggered the problem",
        }
    }

    /// 對應 CLI 結束代碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
