//! Remote operations emitted by the engine.
//!
//! Operations can only be produced by a successful engine request. The
//! caller submits them to the equipment service and feeds the resulting
//! snapshot back in.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Check an item out to a holder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutOperation {
    equipment_id: String,
    holder_id: String,
    expected_return_date: Option<DateTime<Utc>>,
}

impl CheckoutOperation {
    pub(crate) fn new(
        equipment_id: &str,
        holder_id: &str,
        expected_return_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            equipment_id: equipment_id.to_string(),
            holder_id: holder_id.to_string(),
            expected_return_date,
        }
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    pub fn expected_return_date(&self) -> Option<DateTime<Utc>> {
        self.expected_return_date
    }
}

/// Close the holder's active hold on an item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReturnOperation {
    equipment_id: String,
    holder_id: String,
}

impl ReturnOperation {
    pub(crate) fn new(equipment_id: &str, holder_id: &str) -> Self {
        Self {
            equipment_id: equipment_id.to_string(),
            holder_id: holder_id.to_string(),
        }
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }
}

/// Move the expected return date of the holder's active Singleton hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpdateOperation {
    equipment_id: String,
    holder_id: String,
    new_return_date: DateTime<Utc>,
}

impl UpdateOperation {
    pub(crate) fn new(equipment_id: &str, holder_id: &str, new_return_date: DateTime<Utc>) -> Self {
        Self {
            equipment_id: equipment_id.to_string(),
            holder_id: holder_id.to_string(),
            new_return_date,
        }
    }

    pub fn equipment_id(&self) -> &str {
        &self.equipment_id
    }

    pub fn holder_id(&self) -> &str {
        &self.holder_id
    }

    pub fn new_return_date(&self) -> DateTime<Utc> {
        self.new_return_date
    }
}
