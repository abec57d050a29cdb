//! Error handling for the HazVis-RS application
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for HazVis-RS operations
#[derive(Error, Debug)]
pub enum HazVisError {
    /// The parameter catalog could not be fetched or decoded; the view
    /// cannot initialize without it
    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    /// The remote hazard computation failed, or returned a server-flagged
    /// error payload
    #[error("Computation error: {0}")]
    Computation(String),

    /// A submit was attempted with a selection that fails the legality
    /// check; prevented by disabling submission, kept as a last-resort guard
    #[error("Illegal selection: {0}")]
    IllegalSelection(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// Errors related to deep-link query strings
    #[error("Query string error: {0}")]
    Query(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decode/encode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<HazVisError>,
    },
}

impl HazVisError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        HazVisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for HazVis-RS operations
pub type Result<T> = std::result::Result<T, HazVisError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
