//! Structured errors
//!
//! Configuration errors carry a machine-readable code and, where one is
//! obvious, a suggestion for the caller assembling the configuration.

use crate::Cardinality;
use std::path::PathBuf;
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const INVALID_CARDINALITY: &str = "INVALID_CARDINALITY";
    pub const INVALID_VALUE: &str = "INVALID_VALUE";
    pub const NOT_READY: &str = "NOT_READY";
    pub const UNRESOLVED_REFERENCE: &str = "UNRESOLVED_REFERENCE";
    pub const UNKNOWN_REQUIREMENT: &str = "UNKNOWN_REQUIREMENT";
    pub const BUILD_ERROR: &str = "CONFIGURATION_BUILD_ERROR";
}

/// Failure while assigning settings to, or building, a configuration requirement
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("requirement '{identifier}' expects {expected} settings, got {actual}")]
    InvalidCardinality {
        identifier: String,
        expected: Cardinality,
        actual: usize,
    },

    #[error("requirement '{identifier}': {reason}")]
    InvalidValue { identifier: String, reason: String },

    #[error("requirement '{identifier}' has no settings assigned")]
    NotReady { identifier: String },

    #[error("requirement '{identifier}' references unknown {kind} '{reference}'")]
    UnresolvedReference {
        identifier: String,
        kind: &'static str,
        reference: String,
    },

    #[error("no requirement named '{identifier}'")]
    UnknownRequirement { identifier: String },

    #[error("cannot build requirement '{identifier}': {message}")]
    Build { identifier: String, message: String },
}

impl ConfigurationError {
    pub fn invalid_value(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn not_ready(identifier: impl Into<String>) -> Self {
        Self::NotReady {
            identifier: identifier.into(),
        }
    }

    pub fn unresolved(identifier: impl Into<String>, kind: &'static str, reference: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            identifier: identifier.into(),
            kind,
            reference: reference.into(),
        }
    }

    pub fn build(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Build {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConfigurationError::InvalidCardinality { .. } => codes::INVALID_CARDINALITY,
            ConfigurationError::InvalidValue { .. } => codes::INVALID_VALUE,
            ConfigurationError::NotReady { .. } => codes::NOT_READY,
            ConfigurationError::UnresolvedReference { .. } => codes::UNRESOLVED_REFERENCE,
            ConfigurationError::UnknownRequirement { .. } => codes::UNKNOWN_REQUIREMENT,
            ConfigurationError::Build { .. } => codes::BUILD_ERROR,
        }
    }

    /// Identifier of the requirement that failed
    pub fn identifier(&self) -> &str {
        match self {
            ConfigurationError::InvalidCardinality { identifier, .. }
            | ConfigurationError::InvalidValue { identifier, .. }
            | ConfigurationError::NotReady { identifier }
            | ConfigurationError::UnresolvedReference { identifier, .. }
            | ConfigurationError::UnknownRequirement { identifier }
            | ConfigurationError::Build { identifier, .. } => identifier,
        }
    }

    /// Suggestion for fixing the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            ConfigurationError::InvalidCardinality { expected, .. } => {
                Some(format!("Supply {} settings", expected))
            }
            ConfigurationError::NotReady { .. } => {
                Some("Assign settings before building the requirement".to_string())
            }
            ConfigurationError::UnresolvedReference { kind, .. } => {
                Some(format!("Register the {} before running the algorithm", kind))
            }
            ConfigurationError::UnknownRequirement { .. } => {
                Some("Describe the algorithm to list its requirements".to_string())
            }
            ConfigurationError::InvalidValue { .. } | ConfigurationError::Build { .. } => None,
        }
    }
}

/// Failure raised by an algorithm while it executes
#[derive(Debug, Error)]
pub enum AlgorithmError {
    #[error("configuration value '{0}' is missing or has the wrong type")]
    MissingValue(String),

    #[error("input '{input}' is not supported: {reason}")]
    UnsupportedInput { input: String, reason: String },

    #[error("failed to read '{path}'")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("{0}")]
    Execution(String),
}

/// Failure while registering an algorithm with the host
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AlgorithmLoadingError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AlgorithmLoadingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
