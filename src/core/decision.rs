//! Permission decisions derived from a snapshot and the acting user.

use super::model::{ActingUser, EquipmentKind, EquipmentSnapshot};
use serde::{Deserialize, Serialize};

/// Who currently holds an item, relative to the acting user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occupancy {
    /// No active holders.
    Available,
    /// Every active holder is the acting user.
    HeldBySelf,
    /// No active holder is the acting user.
    HeldByOthers,
    /// A Collection held by the acting user and by others.
    HeldByMixed,
}

impl Occupancy {
    pub fn name(&self) -> &str {
        match self {
            Self::Available => "Available",
            Self::HeldBySelf => "HeldBySelf",
            Self::HeldByOthers => "HeldByOthers",
            Self::HeldByMixed => "HeldByMixed",
        }
    }
}

/// Actions available to the acting user. Recomputed on every state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub can_checkout: bool,
    pub can_return: bool,
    pub effective_occupancy: Occupancy,
}

/// Decide what `user` may do with the item described by `snapshot`.
///
/// Total over any snapshot, including ones that break the Singleton holder
/// invariant. Occupancy and returns look at active records only; a
/// Singleton with any current holder, closed or not, cannot be checked out.
///
/// # Example
///
/// ```rust
/// use equipment_checkout::core::{
///     evaluate, ActingUser, EquipmentKind, EquipmentSnapshot, Occupancy,
/// };
///
/// let snapshot = EquipmentSnapshot::new("eq-1", "Microscope", EquipmentKind::Singleton);
/// let decision = evaluate(&snapshot, &ActingUser::new("u1"));
///
/// assert!(decision.can_checkout);
/// assert!(!decision.can_return);
/// assert_eq!(decision.effective_occupancy, Occupancy::Available);
/// ```
pub fn evaluate(snapshot: &EquipmentSnapshot, user: &ActingUser) -> Decision {
    let (mut mine, mut theirs) = (0usize, 0usize);
    for hold in snapshot.active_holds() {
        if hold.is_held_by(user) {
            mine += 1;
        } else {
            theirs += 1;
        }
    }

    let effective_occupancy = match (mine, theirs) {
        (0, 0) => Occupancy::Available,
        (_, 0) => Occupancy::HeldBySelf,
        (0, _) => Occupancy::HeldByOthers,
        _ => Occupancy::HeldByMixed,
    };

    let can_checkout = match snapshot.kind {
        EquipmentKind::Singleton => !snapshot.is_checked_out(),
        EquipmentKind::Collection => true,
    };

    let decision = Decision {
        can_checkout,
        can_return: mine > 0,
        effective_occupancy,
    };

    tracing::debug!(
        equipment_id = %snapshot.id,
        user_id = %user.id,
        occupancy = decision.effective_occupancy.name(),
        can_checkout = decision.can_checkout,
        can_return = decision.can_return,
        "evaluated equipment"
    );

    decision
}
