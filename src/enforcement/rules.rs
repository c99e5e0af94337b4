//! Request and snapshot rules using Validation.

use crate::core::{EquipmentKind, EquipmentSnapshot};
use crate::enforcement::context::RequestContext;
use crate::enforcement::violations::{SnapshotViolation, Violation};
use chrono::Duration;
use std::fmt;
use std::sync::Arc;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for request check functions
pub type RequestCheck =
    Arc<dyn Fn(&RequestContext) -> Validation<(), NonEmptyVec<Violation>> + Send + Sync>;

/// Input rules applied to checkout and return-date requests.
/// Uses Validation to accumulate ALL violations.
#[derive(Clone, Default)]
pub struct CheckoutRules {
    pub(crate) max_loan_duration: Option<Duration>,
    pub(crate) require_collection_return_date: bool,
    pub(crate) custom_checks: Vec<RequestCheck>,
}

impl CheckoutRules {
    /// Enforce all rules, accumulating ALL violations.
    pub fn enforce(&self, context: &RequestContext) -> Validation<(), NonEmptyVec<Violation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<Violation>>> = Vec::new();

        let date_required = match context.equipment_kind {
            EquipmentKind::Singleton => true,
            EquipmentKind::Collection => self.require_collection_return_date,
        };
        if date_required && context.return_date.is_none() {
            checks.push(Validation::fail(Violation::MissingReturnDate {
                kind: context.equipment_kind,
            }));
        }

        if let Some(requested) = context.return_date {
            if requested < context.now {
                checks.push(Validation::fail(Violation::ReturnDateInPast {
                    requested,
                    now: context.now,
                }));
            }

            if let Some(start) = context.hold_start {
                if requested < start {
                    checks.push(Validation::fail(Violation::ReturnDateBeforeStart {
                        requested,
                        start,
                    }));
                }
            }
        }

        if let (Some(max), Some(requested)) = (self.max_loan_duration, context.loan_duration()) {
            if requested > max {
                checks.push(Validation::fail(Violation::LoanTooLong { max, requested }));
            }
        }

        for check_fn in &self.custom_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    pub fn max_loan_duration(&self) -> Option<Duration> {
        self.max_loan_duration
    }

    pub fn requires_collection_return_date(&self) -> bool {
        self.require_collection_return_date
    }
}

impl fmt::Debug for CheckoutRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutRules")
            .field("max_loan_duration", &self.max_loan_duration)
            .field(
                "require_collection_return_date",
                &self.require_collection_return_date,
            )
            .field("custom_checks", &self.custom_checks.len())
            .finish()
    }
}

/// Check a snapshot against the data model invariants.
///
/// Violations are reported, never repaired; `evaluate` stays total over
/// inconsistent snapshots.
pub fn validate_snapshot(
    snapshot: &EquipmentSnapshot,
) -> Validation<(), NonEmptyVec<SnapshotViolation>> {
    let mut checks: Vec<Validation<(), NonEmptyVec<SnapshotViolation>>> = Vec::new();

    if snapshot.kind == EquipmentKind::Singleton && snapshot.current_holders.len() > 1 {
        checks.push(Validation::fail(SnapshotViolation::TooManySingletonHolders {
            count: snapshot.current_holders.len(),
        }));
    }

    for hold in &snapshot.current_holders {
        if !hold.is_active() {
            checks.push(Validation::fail(SnapshotViolation::ClosedCurrentHolder {
                holder_id: hold.holder_id.clone(),
            }));
        }
        match hold.expected_return_date {
            Some(expected) if expected < hold.start_date => {
                checks.push(Validation::fail(SnapshotViolation::ReturnBeforeStart {
                    holder_id: hold.holder_id.clone(),
                }));
            }
            None if snapshot.kind == EquipmentKind::Singleton => {
                checks.push(Validation::fail(
                    SnapshotViolation::MissingSingletonReturnDate {
                        holder_id: hold.holder_id.clone(),
                    },
                ));
            }
            _ => {}
        }
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Flatten a validation outcome into a plain list of failures.
pub fn collect_failures<E: Clone>(validation: Validation<(), NonEmptyVec<E>>) -> Vec<E> {
    match validation {
        Validation::Success(_) => Vec::new(),
        Validation::Failure(errors) => errors.iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HoldRecord;
    use crate::enforcement::builder::RulesBuilder;
    use chrono::{DateTime, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn enforcement_accumulates_all_violations() {
        let rules = RulesBuilder::new()
            .max_loan_duration(Duration::days(14))
            .require_pred(|_ctx| false, "Custom check always fails".to_string())
            .build();

        let context = RequestContext::return_date_update(
            EquipmentKind::Singleton,
            now() - Duration::days(1),
            now() - Duration::days(30),
            now(),
        );

        let result = rules.enforce(&context);

        match result {
            Validation::Failure(errors) => {
                assert_eq!(errors.len(), 3);

                let has_past = errors
                    .iter()
                    .any(|e| matches!(e, Violation::ReturnDateInPast { .. }));
                let has_too_long = errors
                    .iter()
                    .any(|e| matches!(e, Violation::LoanTooLong { .. }));
                let has_custom = errors
                    .iter()
                    .any(|e| matches!(e, Violation::CustomCheckFailed { .. }));

                assert!(has_past);
                assert!(has_too_long);
                assert!(has_custom);
            }
            Validation::Success(_) => panic!("Expected failures, got success"),
        }
    }

    #[test]
    fn default_rules_accept_future_singleton_date() {
        let rules = CheckoutRules::default();
        let context = RequestContext::checkout(
            EquipmentKind::Singleton,
            Some(now() + Duration::days(7)),
            now(),
        );
        assert!(rules.enforce(&context).is_success());
    }

    #[test]
    fn singleton_checkout_requires_return_date() {
        let rules = CheckoutRules::default();
        let context = RequestContext::checkout(EquipmentKind::Singleton, None, now());

        let failures = collect_failures(rules.enforce(&context));
        assert_eq!(
            failures,
            vec![Violation::MissingReturnDate {
                kind: EquipmentKind::Singleton
            }]
        );
    }

    #[test]
    fn collection_date_is_optional_unless_configured() {
        let context = RequestContext::checkout(EquipmentKind::Collection, None, now());
        assert!(CheckoutRules::default().enforce(&context).is_success());

        let strict = RulesBuilder::new().require_collection_return_date().build();
        assert!(strict.enforce(&context).is_failure());
    }

    #[test]
    fn return_date_equal_to_now_is_allowed() {
        let context = RequestContext::checkout(EquipmentKind::Singleton, Some(now()), now());
        assert!(CheckoutRules::default().enforce(&context).is_success());
    }

    #[test]
    fn update_before_hold_start_is_rejected() {
        let context = RequestContext::return_date_update(
            EquipmentKind::Singleton,
            now() + Duration::days(1),
            now() + Duration::days(2),
            now(),
        );
        let failures = collect_failures(CheckoutRules::default().enforce(&context));
        assert!(matches!(
            failures.as_slice(),
            [Violation::ReturnDateBeforeStart { .. }]
        ));
    }

    #[test]
    fn consistent_snapshot_passes_validation() {
        let snapshot = EquipmentSnapshot::new("eq-1", "Drill", EquipmentKind::Singleton)
            .with_holder(HoldRecord::active("u1", "Ada", now(), Some(now())));
        assert!(validate_snapshot(&snapshot).is_success());
    }

    #[test]
    fn inconsistent_snapshot_reports_every_violation() {
        let mut snapshot = EquipmentSnapshot::new("eq-1", "Drill", EquipmentKind::Singleton)
            .with_holder(HoldRecord::active("u1", "Ada", now(), None))
            .with_holder(HoldRecord::active(
                "u2",
                "Grace",
                now(),
                Some(now() - Duration::days(1)),
            ));
        snapshot
            .current_holders
            .push(HoldRecord::active("u3", "Lin", now(), Some(now())).closed_at(now()));

        let failures = collect_failures(validate_snapshot(&snapshot));

        assert!(failures.contains(&SnapshotViolation::TooManySingletonHolders { count: 3 }));
        assert!(failures.contains(&SnapshotViolation::MissingSingletonReturnDate {
            holder_id: "u1".to_string()
        }));
        assert!(failures.contains(&SnapshotViolation::ReturnBeforeStart {
            holder_id: "u2".to_string()
        }));
        assert!(failures.contains(&SnapshotViolation::ClosedCurrentHolder {
            holder_id: "u3".to_string()
        }));
    }
}
