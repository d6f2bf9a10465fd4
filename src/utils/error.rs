use crate::codec::PickleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Pickle error: {0}")]
    PickleError(#[from] PickleError),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, FixtureError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Codec,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl FixtureError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FixtureError::IoError(_) => ErrorCategory::Io,
            FixtureError::PickleError(_)
            | FixtureError::Base64Error(_)
            | FixtureError::SerializationError(_) => ErrorCategory::Codec,
            FixtureError::ConfigError { .. } | FixtureError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Codec => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 程序結束碼：設定錯誤 1，編解碼錯誤 2，IO 錯誤 3
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            FixtureError::IoError(_) => "Check that the output location is writable",
            FixtureError::PickleError(_) => {
                "Make sure the input is a pickled dict of strings (protocol 2-5)"
            }
            FixtureError::Base64Error(_) => "Make sure the input is standard padded base64",
            FixtureError::SerializationError(_) => "Report this as a bug",
            FixtureError::ConfigError { .. } => "Check the configuration file syntax",
            FixtureError::InvalidConfigValueError { .. } => {
                "Fix the value named in the message and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            FixtureError::IoError(e) => format!("Could not write fixture: {}", e),
            FixtureError::PickleError(e) => format!("Invalid pickle data: {}", e),
            FixtureError::Base64Error(e) => format!("Invalid base64 input: {}", e),
            other => other.to_string(),
        }
    }
}
