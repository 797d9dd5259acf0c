//! Error types for the wallet core
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::models::Resource;

// == Wallet Error Enum ==
/// Unified error type for the wallet core.
///
/// Cloneable so that one settled outcome can be handed to every waiter of a
/// single-flight operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// An external fetch failed
    #[error("Failed to fetch {resource}: {cause}")]
    FetchFailed { resource: Resource, cause: String },

    /// A fetched payload could not be interpreted
    #[error("Failed to decode {resource}: {cause}")]
    DecodeFailed { resource: Resource, cause: String },

    /// Writing to the persistent store failed (logged only)
    #[error("Failed to persist {resource}: {cause}")]
    PersistenceFailed { resource: Resource, cause: String },

    /// An in-flight operation was explicitly cancelled
    #[error("Operation cancelled")]
    Cancelled,

    /// Wallet creation failed during initialization
    #[error("Wallet creation failed: {0}")]
    WalletCreation(String),

    /// A refresh was requested for a resource name nobody knows
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Shorthand for a [`WalletError::FetchFailed`].
    pub fn fetch(resource: Resource, cause: impl ToString) -> Self {
        WalletError::FetchFailed {
            resource,
            cause: cause.to_string(),
        }
    }

    /// Shorthand for a [`WalletError::DecodeFailed`].
    pub fn decode(resource: Resource, cause: impl ToString) -> Self {
        WalletError::DecodeFailed {
            resource,
            cause: cause.to_string(),
        }
    }

    /// Shorthand for a [`WalletError::PersistenceFailed`].
    pub fn persistence(resource: Resource, cause: impl ToString) -> Self {
        WalletError::PersistenceFailed {
            resource,
            cause: cause.to_string(),
        }
    }

    /// Returns true if this error came from a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WalletError::Cancelled)
    }
}

// == Result Type Alias ==
/// Convenience Result type for the wallet core.
pub type Result<T> = std::result::Result<T, WalletError>;
