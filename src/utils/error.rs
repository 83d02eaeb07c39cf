use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaitlistError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Message generator error: {message}")]
    GeneratorError { message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

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
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Storage,
    Configuration,
    External,
}

impl WaitlistError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::StorageError { .. } | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Storage
            }
            Self::GeneratorError { .. } | Self::ApiError(_) => ErrorCategory::External,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    /// 呼叫端可以自行修正的錯誤 (400)
    pub fn is_client_error(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }

    /// Text safe to show to an HTTP caller. Internal details only survive for
    /// validation failures.
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ValidationError { message } => message.clone(),
            _ if self.category() == ErrorCategory::Configuration => {
                format!("Configuration problem: {}", self)
            }
            _ => "Server error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "Check the submitted value and try again",
            ErrorCategory::Storage => "Check that the waitlist store is reachable and writable",
            ErrorCategory::Configuration => "Fix the configuration file or environment variables",
            ErrorCategory::External => "Check network access and the generator API key",
        }
    }
}

pub type Result<T> = std::result::Result<T, WaitlistError>;
