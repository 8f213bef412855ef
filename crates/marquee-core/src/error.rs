//! Error types for the Marquee catalog domain.
//!
//! This module defines the error hierarchy used throughout the catalog
//! system. All errors implement the standard `std::error::Error` trait
//! via `thiserror`.
//!
//! Validation errors are recoverable by the caller (bad input); they
//! are the only errors the pure query engine can produce. Store and
//! cache failures have their own taxonomies in the crates that own
//! those collaborators.
//!
//! # Example
//!
//! ```
//! use marquee_core::{CatalogError, Result};
//!
//! fn check_limit(limit: usize) -> Result<()> {
//!     if limit == 0 {
//!         return Err(CatalogError::validation("limit", "must be positive"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_limit(0).is_err());
//! ```

use thiserror::Error;

/// Main error type for catalog domain operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Input failed validation and was rejected.
    #[error("Validation error for field '{field}': {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// An identifier could not be parsed.
    #[error("Invalid movie id '{value}': {reason}")]
    InvalidId {
        /// The invalid value provided
        value: String,
        /// Why it's invalid
        reason: String,
    },

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Creates a Validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates an InvalidId error.
    pub fn invalid_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidId {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an Internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidId { .. })
    }
}

/// Type alias for Results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
