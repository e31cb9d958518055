use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// Result alias used throughout the calculator core
pub type Result<T> = std::result::Result<T, CalcError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The error type for every fallible calculator operation
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        input: Option<String>,
    },

    #[error("[E{code:04}] Operation error: {message}")]
    Operation {
        code: u16,
        message: String,
        operation: Option<String>,
    },

    #[error("[E{code:04}] Configuration error: {message}")]
    Configuration {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Persistence error: {message}")]
    Persistence {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl CalcError {
    /// Create a validation error with default code
    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_with_code(ErrorCode::VALIDATION_GENERIC, message, None)
    }

    /// Create a validation error with specific code and offending input
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        input: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            input,
        }
    }

    /// Create an operation error with default code
    pub fn operation(message: impl Into<String>) -> Self {
        Self::operation_with_code(ErrorCode::OPERATION_GENERIC, message)
    }

    /// Create an operation error with specific code
    pub fn operation_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Operation {
            code,
            message: message.into(),
            operation: None,
        }
    }

    /// Error returned when a name is not present in the operation registry
    pub fn unknown_operation(name: &str) -> Self {
        Self::Operation {
            code: ErrorCode::OPERATION_UNKNOWN,
            message: format!("Unknown operation: {name}"),
            operation: Some(name.to_string()),
        }
    }

    /// Create a configuration error with default code
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::configuration_with_code(ErrorCode::CONFIG_GENERIC, message)
    }

    /// Create a configuration error with specific code
    pub fn configuration_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Configuration {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a persistence error with default code
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::persistence_with_code(ErrorCode::PERSISTENCE_GENERIC, message, None)
    }

    /// Create a persistence error with specific code and path
    pub fn persistence_with_code(
        code: u16,
        message: impl Into<String>,
        path: Option<PathBuf>,
    ) -> Self {
        Self::Persistence {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Attach the operation name to an operation error
    pub fn for_operation(mut self, name: &str) -> Self {
        if let Self::Operation { operation, .. } = &mut self {
            operation.get_or_insert_with(|| name.to_string());
        }
        self
    }

    /// Add a source error. Only configuration and persistence errors keep one.
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Configuration { source: src, .. } | Self::Persistence { source: src, .. } => {
                *src = Some(source.into());
            }
            Self::Validation { .. } | Self::Operation { .. } => {}
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Validation { message, .. }
            | Self::Operation { message, .. }
            | Self::Configuration { message, .. }
            | Self::Persistence { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Validation { code, .. }
            | Self::Operation { code, .. }
            | Self::Configuration { code, .. }
            | Self::Persistence { code, .. } => *code,
        }
    }

    /// Get the bare message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Operation { message, .. }
            | Self::Configuration { message, .. }
            | Self::Persistence { message, .. } => message,
        }
    }

    /// Process exit code used by the binary
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } => 2,
            Self::Operation { .. } => 3,
            Self::Configuration { .. } => 4,
            Self::Persistence { .. } => 5,
        }
    }

    /// Whether the name passed to the registry was not registered
    pub fn is_unknown_operation(&self) -> bool {
        matches!(
            self,
            Self::Operation {
                code: ErrorCode::OPERATION_UNKNOWN,
                ..
            }
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation { .. })
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. })
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, input, .. } => match input {
                Some(raw) => format!("Invalid input '{}': {}", raw, message),
                None => format!("Invalid input: {}", message),
            },
            Self::Operation { message, .. } => message.clone(),
            Self::Configuration { message, .. } => format!("Configuration problem: {}", message),
            Self::Persistence { message, path, .. } => match path {
                Some(p) => format!("History storage error at {}: {}", p.display(), message),
                None => format!("History storage error: {}", message),
            },
        }
    }
}

impl From<std::io::Error> for CalcError {
    fn from(err: std::io::Error) -> Self {
        CalcError::persistence_with_code(ErrorCode::PERSISTENCE_IO_ERROR, err.to_string(), None)
            .with_source(err)
    }
}

impl From<csv::Error> for CalcError {
    fn from(err: csv::Error) -> Self {
        CalcError::persistence_with_code(ErrorCode::PERSISTENCE_CORRUPTED, err.to_string(), None)
            .with_source(err)
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(err: serde_json::Error) -> Self {
        CalcError::persistence_with_code(
            ErrorCode::PERSISTENCE_SERIALIZATION_ERROR,
            err.to_string(),
            None,
        )
        .with_source(err)
    }
}
