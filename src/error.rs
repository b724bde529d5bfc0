//! Error types for Council
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for council operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Request validation errors (4xx)
    EmptyQuestion = 400,
    InvalidRoundCount = 401,
    ModelNotSelected = 402,

    // Invocation errors (5xx)
    ModelInvocationFailed = 500,
    ChatCompletion = 501,
    ModelUnavailable = 502,

    // Discovery errors (6xx)
    NoModelsAvailable = 600,
    ModelDiscoveryFailed = 601,

    // Export errors (7xx)
    ExportFailed = 700,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            400..=499 => 40,
            500..=599 => 50,
            600..=699 => 60,
            700..=799 => 70,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation error
    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Request Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// The question was empty or whitespace only
    #[error("The question for the council is empty")]
    EmptyQuestion,

    /// Round count outside the accepted range
    #[error("Invalid round count {requested}: must be between {min} and {max}")]
    InvalidRoundCount { requested: u32, min: u32, max: u32 },

    /// No model identifier was selected
    #[error("No model selected for the debate")]
    ModelNotSelected,

    // ─────────────────────────────────────────────────────────────
    // Invocation Errors
    // ─────────────────────────────────────────────────────────────

    /// A persona (or the synthesizer) could not be answered by the model
    #[error("{speaker} could not be answered{}: {source}", round_suffix(.round))]
    ModelInvocationFailed {
        speaker: String,
        round: Option<u32>,
        #[source]
        source: Box<Error>,
    },

    /// The chat-completion endpoint rejected or mangled the request
    #[error("Chat completion failed{}: {message}", status_suffix(.status))]
    ChatCompletion { status: Option<u16>, message: String },

    /// The model or its server is not reachable
    #[error("Model {model} unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Discovery Errors
    // ─────────────────────────────────────────────────────────────

    /// Discovery succeeded but listed nothing
    #[error("No models available via {source_name}")]
    NoModelsAvailable { source_name: String },

    /// Discovery itself failed
    #[error("Model discovery via {source_name} failed: {message}")]
    ModelDiscoveryFailed { source_name: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Export Errors
    // ─────────────────────────────────────────────────────────────

    /// Document could not be produced
    #[error("Failed to export {format} transcript: {message}")]
    ExportFailed { format: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    Internal(String),
}

fn round_suffix(round: &Option<u32>) -> String {
    round.map(|r| format!(" in round {}", r)).unwrap_or_default()
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::EmptyQuestion => ErrorCode::EmptyQuestion,
            Error::InvalidRoundCount { .. } => ErrorCode::InvalidRoundCount,
            Error::ModelNotSelected => ErrorCode::ModelNotSelected,

            Error::ModelInvocationFailed { .. } => ErrorCode::ModelInvocationFailed,
            Error::ChatCompletion { .. } => ErrorCode::ChatCompletion,
            Error::ModelUnavailable { .. } => ErrorCode::ModelUnavailable,

            Error::NoModelsAvailable { .. } => ErrorCode::NoModelsAvailable,
            Error::ModelDiscoveryFailed { .. } => ErrorCode::ModelDiscoveryFailed,

            Error::ExportFailed { .. } => ErrorCode::ExportFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// True for errors raised before any model was invoked
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            Error::EmptyQuestion | Error::InvalidRoundCount { .. } | Error::ModelNotSelected
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Wrap a backend failure with the speaker it was raised for
    pub fn attributed_to(self, speaker: impl Into<String>, round: Option<u32>) -> Self {
        match self {
            already @ Error::ModelInvocationFailed { .. } => already,
            other => Error::ModelInvocationFailed {
                speaker: speaker.into(),
                round,
                source: Box::new(other),
            },
        }
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'council config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'council config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid value."
            ),
            Error::EmptyQuestion => Some(
                "Pass a question or topic, e.g. council debate \"How should we shard this database?\""
            ),
            Error::InvalidRoundCount { .. } => Some(
                "Use --rounds with a value between 1 and 100."
            ),
            Error::ModelNotSelected => Some(
                "Pass --model or set 'default_model' in the [model] section."
            ),
            Error::ModelInvocationFailed { source, .. } => source.suggestion(),
            Error::ModelUnavailable { .. } => Some(
                "Check that the model server is running (e.g. 'ollama serve') and the model is pulled."
            ),
            Error::NoModelsAvailable { .. } => Some(
                "No Ollama models found. Install Ollama and pull a model, e.g. 'ollama pull llama3'."
            ),
            Error::ModelDiscoveryFailed { .. } => Some(
                "Ollama may not be installed or not in PATH. Set discovery = \"api\" or \"static\" to skip the CLI."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn chat_completion(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::ChatCompletion {
            status,
            message: message.into(),
        }
    }

    pub fn export_failed(format: impl Into<String>, message: impl fmt::Display) -> Self {
        Error::ExportFailed {
            format: format.into(),
            message: message.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
