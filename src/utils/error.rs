use thiserror::Error;

#[derive(Error, Debug)]
pub enum ErpError {
    #[error("Server unreachable at {url}: {message}")]
    NetworkUnreachable { url: String, message: String },

    #[error("Session expired or not authenticated")]
    Unauthorized,

    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("Malformed response body (status {status}): {message}")]
    ParseError { status: u16, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Server,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErpError::NetworkUnreachable { .. } => ErrorCategory::Network,
            ErpError::Unauthorized => ErrorCategory::Authentication,
            ErpError::HttpError { .. } | ErpError::ParseError { .. } => ErrorCategory::Server,
            ErpError::ConfigError { .. }
            | ErpError::ConfigValidationError { .. }
            | ErpError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ErpError::ValidationError { .. } | ErpError::CsvError(_) => ErrorCategory::Input,
            ErpError::IoError(_) | ErpError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErpError::CsvError(_)
            | ErpError::ValidationError { .. }
            | ErpError::NetworkUnreachable { .. }
            | ErpError::Unauthorized => ErrorSeverity::Medium,
            ErpError::HttpError { status, .. } if *status < 500 => ErrorSeverity::Medium,
            ErpError::HttpError { .. } | ErpError::ParseError { .. } => ErrorSeverity::High,
            ErpError::ConfigError { .. }
            | ErpError::ConfigValidationError { .. }
            | ErpError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            ErpError::IoError(_) | ErpError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Short message suitable for showing to the person at the terminal.
    pub fn user_friendly_message(&self) -> String {
        match self {
            ErpError::NetworkUnreachable { .. } => {
                "Could not reach the ERP server.".to_string()
            }
            ErpError::Unauthorized => "You have been logged out. Please log in again.".to_string(),
            ErpError::HttpError { message, .. } => format!("The server rejected the request: {}", message),
            ErpError::ParseError { .. } => "The server sent a response that could not be read.".to_string(),
            ErpError::ValidationError { message } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your connection and the configured base URL",
            ErrorCategory::Authentication => "Run `tour-erp login` to start a new session",
            ErrorCategory::Server => "Check the request data, or try again later if the server is failing",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::Input => "Correct the input and retry",
            ErrorCategory::System => "Check file permissions and free disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, ErpError>;
