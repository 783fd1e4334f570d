//! Error types for linkschema
//!
//! This module defines the engine-fault channel. Validation findings are
//! *not* errors: they are [`Diagnostic`](crate::validators::Diagnostic)
//! values returned as plain data. Everything here terminates a build or a
//! validation run instead.

use thiserror::Error;

/// Result type alias using linkschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for linkschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or unsupported XPath expression
    #[error("invalid XPath '{expression}': {message}")]
    Xpath {
        /// The offending expression
        expression: String,
        /// What was wrong with it
        message: String,
    },

    /// Namespace error (unknown prefix)
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Schema construction error (invariant violation in the builder)
    #[error("schema error: {0}")]
    Schema(String),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Schema configuration error
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an XPath error for the given expression
    pub fn xpath(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Xpath {
            expression: expression.into(),
            message: message.into(),
        }
    }
}
