//! Error types module
//!
//! All handshake and infrastructure errors are unified under `AppError`. Upload
//! failures have their own `UploadError` taxonomy because their message is shown
//! to the user verbatim in the upload status line.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like malformed form input
    Debug,
    /// Warning level - for recoverable issues like an expired token
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TOKEN_ENDPOINT_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether the user can recover by starting over (new login or new submission)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed identity token: {0}")]
    MalformedToken(String),

    #[error("Token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Credential federation failed: {0}")]
    Federation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Template rendering error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Configuration(_) => (
            500,
            "CONFIGURATION_ERROR",
            false,
            Some("Check the deployment configuration"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::MalformedToken(_) => (
            401,
            "MALFORMED_TOKEN",
            true,
            Some("Sign in again"),
            false,
            LogLevel::Warn,
        ),
        AppError::TokenEndpoint { .. } => (
            502,
            "TOKEN_ENDPOINT_ERROR",
            true,
            Some("Sign in again"),
            true,
            LogLevel::Error,
        ),
        AppError::Http(_) => (
            502,
            "HTTP_ERROR",
            true,
            Some("Reload the page"),
            true,
            LogLevel::Error,
        ),
        AppError::Federation(_) => (
            403,
            "FEDERATION_ERROR",
            true,
            Some("Sign in again"),
            false,
            LogLevel::Warn,
        ),
        AppError::Storage(_) => (
            502,
            "STORAGE_ERROR",
            true,
            Some("Submit the upload again"),
            false,
            LogLevel::Error,
        ),
        AppError::Template(_) => (500, "TEMPLATE_ERROR", false, None, true, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", false, None, true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Variant name, used as a structured logging field
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "Configuration",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::MalformedToken(_) => "MalformedToken",
            AppError::TokenEndpoint { .. } => "TokenEndpoint",
            AppError::Http(_) => "Http",
            AppError::Federation(_) => "Federation",
            AppError::Storage(_) => "Storage",
            AppError::Template(_) => "Template",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "InternalWithSource",
        }
    }

    /// Full message including the source chain, for non-production responses
    pub fn detailed_message(&self) -> String {
        match self {
            AppError::InternalWithSource { message, source } => {
                format!("{}: {:#}", message, source)
            }
            other => other.to_string(),
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Configuration(_) => "Service is misconfigured".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::MalformedToken(_) => "Identity token could not be read".to_string(),
            AppError::TokenEndpoint { .. } => "Failed to complete sign-in".to_string(),
            AppError::Http(_) => "Upstream request failed".to_string(),
            AppError::Federation(ref msg) => msg.clone(),
            AppError::Storage(ref msg) => msg.clone(),
            AppError::Template(_) => "Failed to render page".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}

/// Reasons a single upload submission fails.
///
/// `Display` is the bare message that ends up in `Error!! (<message>)`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No identity token")]
    MissingToken,

    #[error("Identity token has expired")]
    ExpiredToken,

    #[error("No file selected")]
    MissingFile,

    #[error("{0}")]
    Credentials(String),

    #[error("{0}")]
    Storage(String),
}

impl UploadError {
    /// Bare message shown inside the failure status line
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<AppError> for UploadError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Federation(msg) => UploadError::Credentials(msg),
            AppError::Storage(msg) => UploadError::Storage(msg),
            other => UploadError::Credentials(other.client_message()),
        }
    }
}
