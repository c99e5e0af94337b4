//! Validation-based rules for checkout requests and snapshots.
//!
//! Request input is checked with Stillwater's `Validation` type so that
//! every problem with a request is reported at once. A user who picked a
//! past return date on equipment with a loan limit sees both problems in
//! one prompt instead of fixing them one at a time.
//!
//! # Example
//!
//! ```rust
//! use equipment_checkout::core::EquipmentKind;
//! use equipment_checkout::enforcement::{RequestContext, RulesBuilder};
//! use chrono::{Duration, Utc};
//!
//! let rules = RulesBuilder::new()
//!     .max_loan_duration(Duration::days(14))
//!     .build();
//!
//! let now = Utc::now();
//! let context = RequestContext::checkout(
//!     EquipmentKind::Singleton,
//!     Some(now + Duration::days(30)),
//!     now,
//! );
//! assert!(rules.enforce(&context).is_failure());
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

// Re-export commonly used types
pub use builder::{RulesBuilder, RulesConfig, RulesConfigError};
pub use context::RequestContext;
pub use rules::{collect_failures, validate_snapshot, CheckoutRules};
pub use violations::{SnapshotViolation, Violation};
