//! Rule violations for requests and snapshots.

use crate::core::EquipmentKind;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// A single broken input rule on a checkout or return-date request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("A return date is required for {} equipment", .kind.name())]
    MissingReturnDate { kind: EquipmentKind },

    #[error("Return date {requested} is in the past (now: {now})")]
    ReturnDateInPast {
        requested: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("Return date {requested} is before the checkout start {start}")]
    ReturnDateBeforeStart {
        requested: DateTime<Utc>,
        start: DateTime<Utc>,
    },

    #[error("Loan period {requested} exceeds the maximum of {max}")]
    LoanTooLong { max: Duration, requested: Duration },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}

/// A snapshot from the equipment service that breaks a data model invariant.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnapshotViolation {
    #[error("Singleton equipment has {count} current holders")]
    TooManySingletonHolders { count: usize },

    #[error("Hold by '{holder_id}' on singleton equipment has no return date")]
    MissingSingletonReturnDate { holder_id: String },

    #[error("Hold by '{holder_id}' expects a return before it started")]
    ReturnBeforeStart { holder_id: String },

    #[error("Closed hold by '{holder_id}' is listed as a current holder")]
    ClosedCurrentHolder { holder_id: String },
}
