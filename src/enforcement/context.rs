//! Context provided to request checks.

use crate::core::EquipmentKind;
use chrono::{DateTime, Duration, Utc};

/// Context provided to request checks
#[derive(Clone, Debug)]
pub struct RequestContext {
    pub equipment_kind: EquipmentKind,
    pub return_date: Option<DateTime<Utc>>,
    /// Start of the existing hold; `None` for a new checkout
    pub hold_start: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn checkout(
        equipment_kind: EquipmentKind,
        return_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            equipment_kind,
            return_date,
            hold_start: None,
            now,
        }
    }

    pub fn return_date_update(
        equipment_kind: EquipmentKind,
        return_date: DateTime<Utc>,
        hold_start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            equipment_kind,
            return_date: Some(return_date),
            hold_start: Some(hold_start),
            now,
        }
    }

    /// When the loan began, or begins for a new checkout (pure)
    pub fn loan_start(&self) -> DateTime<Utc> {
        self.hold_start.unwrap_or(self.now)
    }

    /// Requested loan length, if a return date was given (pure)
    pub fn loan_duration(&self) -> Option<Duration> {
        self.return_date
            .map(|date| date.signed_duration_since(self.loan_start()))
    }
}
