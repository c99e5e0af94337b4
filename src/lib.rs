//! Equipment checkout: a pure lifecycle engine for shared lab equipment
//!
//! The crate follows a "pure core, imperative shell" layout. Deciding who
//! may check out or return an item, paging its history and laying it out
//! for display are pure functions over immutable snapshots. Talking to the
//! equipment service happens in a thin effectful shell.
//!
//! # Core Concepts
//!
//! - **Snapshot**: Immutable point-in-time read of an item and its holders
//! - **Decision**: What the acting user may do right now, via `evaluate`
//! - **Operations**: Remote calls the engine asks the caller to perform
//! - **Sections**: Ordered, deterministic display rows built by `project`
//!
//! # Example
//!
//! ```rust
//! use equipment_checkout::{evaluate, project, request_checkout, request_return};
//! use equipment_checkout::core::{ActingUser, EquipmentKind, EquipmentSnapshot, HoldRecord};
//! use equipment_checkout::projection::SessionFlags;
//! use chrono::{Duration, Utc};
//!
//! let user = ActingUser::new("u1");
//! let snapshot = EquipmentSnapshot::new("eq-1", "Thermal camera", EquipmentKind::Singleton);
//!
//! let due = Utc::now() + Duration::days(7);
//! let operation = request_checkout(&snapshot, &user, Some(due)).unwrap();
//! assert_eq!(operation.expected_return_date(), Some(due));
//!
//! // The service answers with a fresh snapshot.
//! let held = snapshot.with_holder(HoldRecord::active("u1", "Ada", Utc::now(), Some(due)));
//! assert!(request_return(&held, &user).is_ok());
//!
//! let decision = evaluate(&held, &user);
//! let sections = project(&held, &decision, None, &SessionFlags::default());
//! assert!(!sections.is_empty());
//! ```

pub mod core;
pub mod effects;
pub mod enforcement;
pub mod engine;
pub mod projection;

// Re-export commonly used types
pub use crate::core::{
    evaluate, merge_history_page, ActingUser, Decision, EquipmentKind, EquipmentSnapshot,
    HistoryPage, HoldRecord, Occupancy,
};
pub use crate::engine::{
    request_checkout, request_return, request_return_date_update, CheckoutError, Engine,
};
pub use crate::projection::{project, RowDescriptor, Section, SessionFlags};
