//! Pure checkout core.
//!
//! This module contains the side-effect free part of the engine:
//! - The equipment data model read from the external service
//! - `evaluate`, which turns a snapshot into a `Decision`
//! - Immutable history pages and their merge rule
//!
//! Nothing here performs I/O. Fresh data is fed in by the shell in
//! [`crate::effects`].

mod decision;
mod history;
mod model;

pub use decision::{evaluate, Decision, Occupancy};
pub use history::{merge_history_page, HistoryCursor, HistoryPage};
pub use model::{ActingUser, EquipmentKind, EquipmentSnapshot, HoldRecord};
