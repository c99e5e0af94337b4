//! Checkout state engine.
//!
//! The engine turns a user's intent (check out, return, move the return
//! date) into a remote operation, or a typed error explaining why the
//! intent is not allowed right now. It never performs I/O and never
//! mutates the snapshot it is given.
//!
//! # Example
//!
//! ```rust
//! use equipment_checkout::core::{ActingUser, EquipmentKind, EquipmentSnapshot};
//! use equipment_checkout::engine::{CheckoutError, Engine};
//! use chrono::{Duration, Utc};
//!
//! let engine = Engine::default();
//! let snapshot = EquipmentSnapshot::new("eq-1", "Soldering station", EquipmentKind::Singleton);
//! let user = ActingUser::new("u1");
//!
//! let operation = engine
//!     .request_checkout(&snapshot, &user, Some(Utc::now() + Duration::days(7)))
//!     .unwrap();
//! assert_eq!(operation.holder_id(), "u1");
//!
//! let missing_date = engine.request_checkout(&snapshot, &user, None);
//! assert!(matches!(missing_date, Err(CheckoutError::InvalidInput { .. })));
//! ```

mod error;
mod operation;

pub use error::{CheckoutError, Recovery, RemoteError};
pub use operation::{CheckoutOperation, ReturnOperation, UpdateOperation};

use crate::core::{evaluate, ActingUser, Decision, EquipmentSnapshot};
use crate::enforcement::{collect_failures, CheckoutRules, RequestContext};
use chrono::{DateTime, Utc};

/// Checkout engine configured with a set of input rules.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    rules: CheckoutRules,
}

impl Engine {
    pub fn new(rules: CheckoutRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CheckoutRules {
        &self.rules
    }

    /// Decide what `user` may do with the item (pure)
    pub fn evaluate(&self, snapshot: &EquipmentSnapshot, user: &ActingUser) -> Decision {
        evaluate(snapshot, user)
    }

    /// Request a checkout, comparing the return date against the current time.
    pub fn request_checkout(
        &self,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
        expected_return_date: Option<DateTime<Utc>>,
    ) -> Result<CheckoutOperation, CheckoutError> {
        self.request_checkout_at(snapshot, user, expected_return_date, Utc::now())
    }

    /// Request a checkout as of `now`.
    ///
    /// A Singleton with any current holder is a `Conflict`, whatever the
    /// requested date. A stale closed record still blocks the checkout. Otherwise every input rule is checked and all
    /// violations are reported together. `snapshot` must be the freshest
    /// read available; the check is only as good as the snapshot.
    pub fn request_checkout_at(
        &self,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
        expected_return_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<CheckoutOperation, CheckoutError> {
        if snapshot.kind.is_exclusive() {
            if let Some(holder) = snapshot.current_holders.first() {
                tracing::debug!(
                    equipment_id = %snapshot.id,
                    user_id = %user.id,
                    holder_id = %holder.holder_id,
                    "checkout conflicts with current holder"
                );
                return Err(CheckoutError::Conflict {
                    equipment_id: snapshot.id.clone(),
                    holder_id: holder.holder_id.clone(),
                });
            }
        }

        let context = RequestContext::checkout(snapshot.kind, expected_return_date, now);
        self.check_input(&context, snapshot, user)?;

        Ok(CheckoutOperation::new(
            &snapshot.id,
            &user.id,
            expected_return_date,
        ))
    }

    /// Request that `user` return the item.
    pub fn request_return(
        &self,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
    ) -> Result<ReturnOperation, CheckoutError> {
        if !evaluate(snapshot, user).can_return {
            tracing::debug!(
                equipment_id = %snapshot.id,
                user_id = %user.id,
                "return denied: user holds no active record"
            );
            return Err(CheckoutError::PermissionDenied {
                user_id: user.id.clone(),
                equipment_id: snapshot.id.clone(),
                action: "return",
            });
        }

        Ok(ReturnOperation::new(&snapshot.id, &user.id))
    }

    /// Request a new return date, comparing it against the current time.
    pub fn request_return_date_update(
        &self,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
        new_date: DateTime<Utc>,
    ) -> Result<UpdateOperation, CheckoutError> {
        self.request_return_date_update_at(snapshot, user, new_date, Utc::now())
    }

    /// Request a new return date as of `now`.
    ///
    /// Only the holder of the single active hold on Singleton equipment may
    /// move its return date. Collection holds are fungible within the pool
    /// and their dates cannot be edited individually.
    pub fn request_return_date_update_at(
        &self,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
        new_date: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<UpdateOperation, CheckoutError> {
        let Some(hold) = snapshot
            .sole_singleton_hold()
            .filter(|hold| hold.is_held_by(user))
        else {
            tracing::debug!(
                equipment_id = %snapshot.id,
                user_id = %user.id,
                kind = snapshot.kind.name(),
                "return date update denied"
            );
            return Err(CheckoutError::PermissionDenied {
                user_id: user.id.clone(),
                equipment_id: snapshot.id.clone(),
                action: "change the return date of",
            });
        };

        let context =
            RequestContext::return_date_update(snapshot.kind, new_date, hold.start_date, now);
        self.check_input(&context, snapshot, user)?;

        Ok(UpdateOperation::new(&snapshot.id, &user.id, new_date))
    }

    fn check_input(
        &self,
        context: &RequestContext,
        snapshot: &EquipmentSnapshot,
        user: &ActingUser,
    ) -> Result<(), CheckoutError> {
        let violations = collect_failures(self.rules.enforce(context));
        if violations.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            equipment_id = %snapshot.id,
            user_id = %user.id,
            violations = violations.len(),
            "request rejected by input rules"
        );
        Err(CheckoutError::InvalidInput { violations })
    }
}

/// Request a checkout with the default rules.
pub fn request_checkout(
    snapshot: &EquipmentSnapshot,
    user: &ActingUser,
    expected_return_date: Option<DateTime<Utc>>,
) -> Result<CheckoutOperation, CheckoutError> {
    Engine::default().request_checkout(snapshot, user, expected_return_date)
}

/// Request a return with the default rules.
pub fn request_return(
    snapshot: &EquipmentSnapshot,
    user: &ActingUser,
) -> Result<ReturnOperation, CheckoutError> {
    Engine::default().request_return(snapshot, user)
}

/// Request a return date change with the default rules.
pub fn request_return_date_update(
    snapshot: &EquipmentSnapshot,
    user: &ActingUser,
    new_date: DateTime<Utc>,
) -> Result<UpdateOperation, CheckoutError> {
    Engine::default().request_return_date_update(snapshot, user, new_date)
}
