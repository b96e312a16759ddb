//! Custom error types for the task scheduler
//!
//! Most of the crate propagates `anyhow::Error`; these types exist where a
//! caller has to branch on the kind of failure (validation vs. configuration
//! vs. a remote call that failed).

use std::fmt;

/// Main error type for the task scheduler
#[derive(Debug)]
pub enum TaskbotError {
    /// Configuration or credential errors
    Config(ConfigError),

    /// Malformed user input, rejected before any state mutation
    Validation(ValidationError),

    /// Errors returned by the task tracker or coursework provider
    Remote(RemoteError),

    /// JSON store errors
    Store(StoreError),

    /// Other errors with context
    Other(String),
}

/// Configuration error variants
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Missing required configuration or credential
    MissingRequired { field: String },
}

/// Input validation error variants
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Time string not in HH:MM form
    InvalidTimeFormat { value: String },

    /// Hour or minute out of range
    TimeOutOfRange { value: String },

    /// Unknown weekday name
    InvalidWeekday { value: String },

    /// Required text field was empty
    EmptyField { field: String },

    /// Text field exceeded its maximum length
    TooLong { field: String, max: usize },

    /// Cron expression rejected
    InvalidSchedule { value: String, reason: String },
}

/// Remote API error variants
#[derive(Debug)]
pub enum RemoteError {
    /// Request could not be sent
    RequestFailed { service: String, reason: String },

    /// Remote service answered with a non-success status
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// Response body could not be decoded
    InvalidResponse { service: String, reason: String },

    /// Token exchange or credential rejection
    AuthenticationFailed { service: String, reason: String },
}

/// Store error variants
#[derive(Debug)]
pub enum StoreError {
    /// Failed to read or write the backing document
    Io { path: String, reason: String },

    /// Document exists but could not be parsed
    Corrupt { path: String, reason: String },
}

impl fmt::Display for TaskbotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskbotError::Config(e) => write!(f, "Configuration error: {}", e),
            TaskbotError::Validation(e) => write!(f, "Validation error: {}", e),
            TaskbotError::Remote(e) => write!(f, "Remote error: {}", e),
            TaskbotError::Store(e) => write!(f, "Store error: {}", e),
            TaskbotError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::MissingRequired { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidTimeFormat { value } => {
                write!(f, "Time '{}' must be in HH:MM format", value)
            }
            ValidationError::TimeOutOfRange { value } => {
                write!(f, "Time '{}' must be between 00:00 and 23:59", value)
            }
            ValidationError::InvalidWeekday { value } => {
                write!(f, "Unknown weekday '{}'", value)
            }
            ValidationError::EmptyField { field } => {
                write!(f, "Field '{}' must not be empty", field)
            }
            ValidationError::TooLong { field, max } => {
                write!(f, "Field '{}' must be at most {} characters", field, max)
            }
            ValidationError::InvalidSchedule { value, reason } => {
                write!(f, "Invalid schedule '{}': {}", value, reason)
            }
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::RequestFailed { service, reason } => {
                write!(f, "Request to {} failed: {}", service, reason)
            }
            RemoteError::Status {
                service,
                status,
                body,
            } => {
                write!(f, "{} returned status {}: {}", service, status, body)
            }
            RemoteError::InvalidResponse { service, reason } => {
                write!(f, "Invalid response from {}: {}", service, reason)
            }
            RemoteError::AuthenticationFailed { service, reason } => {
                write!(f, "Authentication with {} failed: {}", service, reason)
            }
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io { path, reason } => write!(f, "I/O on '{}' failed: {}", path, reason),
            StoreError::Corrupt { path, reason } => {
                write!(f, "Document '{}' is corrupt: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for TaskbotError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for RemoteError {}
impl std::error::Error for StoreError {}

impl From<anyhow::Error> for TaskbotError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(validation) => TaskbotError::Validation(validation),
            Err(err) => match err.downcast::<ConfigError>() {
                Ok(config) => TaskbotError::Config(config),
                Err(err) => TaskbotError::Other(format!("{:#}", err)),
            },
        }
    }
}

impl From<ConfigError> for TaskbotError {
    fn from(err: ConfigError) -> Self {
        TaskbotError::Config(err)
    }
}

impl From<ValidationError> for TaskbotError {
    fn from(err: ValidationError) -> Self {
        TaskbotError::Validation(err)
    }
}

impl From<RemoteError> for TaskbotError {
    fn from(err: RemoteError) -> Self {
        TaskbotError::Remote(err)
    }
}

impl From<StoreError> for TaskbotError {
    fn from(err: StoreError) -> Self {
        TaskbotError::Store(err)
    }
}

impl TaskbotError {
    /// True for input the caller can fix by resubmitting
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskbotError::Validation(_))
    }
}
