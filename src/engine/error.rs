//! Checkout error taxonomy.

use crate::enforcement::Violation;
use thiserror::Error;

/// Opaque failure reported by the external equipment service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct RemoteError {
    pub message: String,
}

impl RemoteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur when requesting or running a checkout operation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Invalid input: {}", describe_violations(.violations))]
    InvalidInput { violations: Vec<Violation> },

    #[error("User '{user_id}' may not {action} equipment '{equipment_id}'")]
    PermissionDenied {
        user_id: String,
        equipment_id: String,
        action: &'static str,
    },

    #[error("Equipment '{equipment_id}' is already checked out by '{holder_id}'")]
    Conflict {
        equipment_id: String,
        holder_id: String,
    },

    #[error("Remote operation failed: {0}")]
    Remote(#[from] RemoteError),
}

fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// How the presentation layer should react to a failure. The engine itself
/// never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Ask the user for corrected input
    Reprompt,

    /// Show a blocking message, do not retry
    Block,

    /// Re-fetch the snapshot and evaluate again before retrying
    Refetch,

    /// Surface the message and let the user retry by hand
    ManualRetry,
}

impl CheckoutError {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::InvalidInput { .. } => Recovery::Reprompt,
            Self::PermissionDenied { .. } => Recovery::Block,
            Self::Conflict { .. } => Recovery::Refetch,
            Self::Remote(_) => Recovery::ManualRetry,
        }
    }

    /// Violations carried by an `InvalidInput` error; empty otherwise.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::InvalidInput { violations } => violations,
            _ => &[],
        }
    }
}
