//! Equipment data model.
//!
//! Every type here is an immutable value read from the external equipment
//! service. Snapshots are replaced wholesale on each fetch; nothing in this
//! crate mutates them in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an item may have more than one simultaneous holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    /// Exclusive equipment: at most one holder at a time.
    Singleton,
    /// Pooled equipment: any number of concurrent holders.
    Collection,
}

impl EquipmentKind {
    pub fn name(&self) -> &str {
        match self {
            Self::Singleton => "Singleton",
            Self::Collection => "Collection",
        }
    }

    pub fn is_exclusive(&self) -> bool {
        matches!(self, Self::Singleton)
    }
}

/// An active or historical checkout of an item by one holder.
///
/// A record with `end_date` set is closed history. A record without one is
/// the active hold for its holder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRecord {
    pub holder_id: String,
    pub holder_name: String,
    pub start_date: DateTime<Utc>,
    /// Absent only for Collection equipment
    pub expected_return_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl HoldRecord {
    /// Create an active hold starting at `start_date`.
    pub fn active(
        holder_id: impl Into<String>,
        holder_name: impl Into<String>,
        start_date: DateTime<Utc>,
        expected_return_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            holder_id: holder_id.into(),
            holder_name: holder_name.into(),
            start_date,
            expected_return_date,
            end_date: None,
        }
    }

    /// Close this hold at `end_date`, returning the historical record.
    pub fn closed_at(&self, end_date: DateTime<Utc>) -> Self {
        Self {
            end_date: Some(end_date),
            ..self.clone()
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    pub fn is_held_by(&self, user: &ActingUser) -> bool {
        self.holder_id == user.id
    }
}

/// The party requesting an action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActingUser {
    pub id: String,
}

impl ActingUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Point-in-time read of an equipment item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSnapshot {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub password: Option<String>,
    pub kind: EquipmentKind,
    /// Active holds in the order the service reports them. Repeated holder
    /// ids are separate reservations and are never merged.
    pub current_holders: Vec<HoldRecord>,
    /// Most recent hold, active or closed.
    pub last_hold: Option<HoldRecord>,
}

impl EquipmentSnapshot {
    /// Create a snapshot with no holders and no optional details.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EquipmentKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            icon_name: None,
            make: None,
            model: None,
            serial_number: None,
            password: None,
            kind,
            current_holders: Vec::new(),
            last_hold: None,
        }
    }

    /// Return a copy with `hold` appended to the current holders.
    ///
    /// `last_hold` is updated when the new hold is the most recent one.
    pub fn with_holder(&self, hold: HoldRecord) -> Self {
        let mut next = self.clone();
        let is_latest = next
            .last_hold
            .as_ref()
            .is_none_or(|last| last.start_date <= hold.start_date);
        if is_latest {
            next.last_hold = Some(hold.clone());
        }
        next.current_holders.push(hold);
        next
    }

    /// True while the service lists any current holder, closed or not.
    pub fn is_checked_out(&self) -> bool {
        !self.current_holders.is_empty()
    }

    /// Active records among the current holders.
    pub fn active_holds(&self) -> impl Iterator<Item = &HoldRecord> {
        self.current_holders.iter().filter(|h| h.is_active())
    }

    /// First active hold belonging to `user`, if any.
    pub fn active_hold_of(&self, user: &ActingUser) -> Option<&HoldRecord> {
        self.active_holds().find(|h| h.is_held_by(user))
    }

    /// The sole active hold of a Singleton item.
    ///
    /// Returns `None` for Collection equipment or when the item is not held
    /// by exactly one record.
    pub fn sole_singleton_hold(&self) -> Option<&HoldRecord> {
        if self.kind != EquipmentKind::Singleton {
            return None;
        }
        let mut active = self.active_holds();
        match (active.next(), active.next()) {
            (Some(hold), None) => Some(hold),
            _ => None,
        }
    }
}
