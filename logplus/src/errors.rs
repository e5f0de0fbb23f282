//! Error types for the logplus context core.
//!
//! The core is infrastructure for logging and never logs its own
//! failures; everything here surfaces directly to the caller.

use thiserror::Error;

/// The main error type for logplus operations.
#[derive(Debug, Error)]
pub enum LogplusError {
    /// A reset token could not be applied.
    #[error("{0}")]
    InvalidResetToken(#[from] InvalidResetTokenError),
}

/// Why a reset token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResetTokenRejection {
    /// No scoped variable was ever created for the token's key.
    #[error("no scoped variable was ever created for this key")]
    UnknownVariable,

    /// The token was produced in a different execution context.
    #[error("the token was produced in a different execution context")]
    ForeignContext,
}

/// Error raised when a reset token cannot be applied in the current
/// execution context.
///
/// This indicates a lifecycle bug in the caller: tokens are only valid
/// for the variable and the execution context that produced them.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid reset token for key '{key}': {reason}")]
pub struct InvalidResetTokenError {
    /// The key the token was presented for.
    pub key: String,
    /// Why the token was rejected.
    pub reason: ResetTokenRejection,
}

impl InvalidResetTokenError {
    /// Creates an error for a token whose variable was never created.
    #[must_use]
    pub fn unknown_variable(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: ResetTokenRejection::UnknownVariable,
        }
    }

    /// Creates an error for a token used outside its originating context.
    #[must_use]
    pub fn foreign_context(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            reason: ResetTokenRejection::ForeignContext,
        }
    }
}
