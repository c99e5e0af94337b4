//! Property-based tests for the checkout engine and projection.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated snapshots and history pages.

use chrono::{DateTime, Duration, TimeZone, Utc};
use equipment_checkout::core::{
    evaluate, merge_history_page, ActingUser, EquipmentKind, EquipmentSnapshot, HistoryPage,
    HoldRecord, Occupancy,
};
use equipment_checkout::engine::{CheckoutError, Engine};
use equipment_checkout::projection::{project, SectionKind, SessionFlags};
use proptest::prelude::*;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

prop_compose! {
    fn arbitrary_kind()(variant in 0..2u8) -> EquipmentKind {
        if variant == 0 {
            EquipmentKind::Singleton
        } else {
            EquipmentKind::Collection
        }
    }
}

prop_compose! {
    fn arbitrary_hold()(
        holder in 0..4u8,
        start_hours in 0..2_000i64,
        due_hours in prop::option::of(1..500i64),
        closed_after in prop::option::of(1..500i64),
    ) -> HoldRecord {
        let start = base_time() + Duration::hours(start_hours);
        let hold = HoldRecord::active(
            format!("u{holder}"),
            format!("User {holder}"),
            start,
            due_hours.map(|h| start + Duration::hours(h)),
        );
        match closed_after {
            Some(h) => hold.closed_at(start + Duration::hours(h)),
            None => hold,
        }
    }
}

prop_compose! {
    fn arbitrary_active_hold()(
        holder in 0..4u8,
        start_hours in 0..2_000i64,
        due_hours in prop::option::of(1..500i64),
    ) -> HoldRecord {
        let start = base_time() + Duration::hours(start_hours);
        HoldRecord::active(
            format!("u{holder}"),
            format!("User {holder}"),
            start,
            due_hours.map(|h| start + Duration::hours(h)),
        )
    }
}

prop_compose! {
    fn arbitrary_snapshot()(
        kind in arbitrary_kind(),
        holds in prop::collection::vec(arbitrary_active_hold(), 0..4),
        password in prop::option::of("[a-z0-9]{0,8}"),
    ) -> EquipmentSnapshot {
        // A Singleton never has more than one active holder.
        let holds: Vec<_> = if kind == EquipmentKind::Singleton {
            holds.into_iter().take(1).collect()
        } else {
            holds
        };
        let mut snapshot = EquipmentSnapshot::new("eq-prop", "Prop item", kind);
        snapshot.password = password;
        holds.into_iter().fold(snapshot, |s, h| s.with_holder(h))
    }
}

prop_compose! {
    fn arbitrary_page()(
        records in prop::collection::vec(arbitrary_hold(), 0..6),
        has_more in any::<bool>(),
    ) -> HistoryPage {
        HistoryPage::new(records, has_more)
    }
}

prop_compose! {
    fn arbitrary_user()(id in 0..4u8) -> ActingUser {
        ActingUser::new(format!("u{id}"))
    }
}

fn keys(page: &HistoryPage) -> Vec<(String, DateTime<Utc>)> {
    page.records()
        .iter()
        .map(|r| (r.holder_id.clone(), r.start_date))
        .collect()
}

proptest! {
    #[test]
    fn evaluate_is_deterministic(snapshot in arbitrary_snapshot(), user in arbitrary_user()) {
        prop_assert_eq!(evaluate(&snapshot, &user), evaluate(&snapshot, &user));
    }

    #[test]
    fn can_return_iff_user_holds(snapshot in arbitrary_snapshot(), user in arbitrary_user()) {
        let decision = evaluate(&snapshot, &user);
        prop_assert_eq!(decision.can_return, snapshot.active_hold_of(&user).is_some());
    }

    #[test]
    fn collection_checkout_always_allowed(
        snapshot in arbitrary_snapshot(),
        user in arbitrary_user(),
    ) {
        prop_assume!(snapshot.kind == EquipmentKind::Collection);
        prop_assert!(evaluate(&snapshot, &user).can_checkout);
    }

    #[test]
    fn occupancy_available_iff_no_active_holds(
        snapshot in arbitrary_snapshot(),
        user in arbitrary_user(),
    ) {
        let decision = evaluate(&snapshot, &user);
        prop_assert_eq!(
            decision.effective_occupancy == Occupancy::Available,
            snapshot.active_holds().next().is_none()
        );
    }

    #[test]
    fn occupied_singleton_checkout_always_conflicts(
        hold in arbitrary_active_hold(),
        user in arbitrary_user(),
        offset_hours in -1_000..1_000i64,
        with_date in any::<bool>(),
    ) {
        let snapshot = EquipmentSnapshot::new("eq-prop", "Prop item", EquipmentKind::Singleton)
            .with_holder(hold);
        let now = base_time();
        let date = with_date.then(|| now + Duration::hours(offset_hours));

        let result = Engine::default().request_checkout_at(&snapshot, &user, date, now);

        let is_conflict = matches!(result, Err(CheckoutError::Conflict { .. }));
        prop_assert!(is_conflict);
    }

    #[test]
    fn merge_is_idempotent(a in arbitrary_page(), b in arbitrary_page()) {
        let once = merge_history_page(Some(&a), &b);
        let twice = merge_history_page(Some(&once), &b);
        prop_assert_eq!(keys(&once), keys(&twice));
        prop_assert_eq!(once.has_more(), twice.has_more());
    }

    #[test]
    fn remerging_earlier_page_adds_nothing(a in arbitrary_page(), b in arbitrary_page()) {
        let ab = merge_history_page(Some(&a), &b);
        let aba = merge_history_page(Some(&ab), &a);

        let mut ab_keys = keys(&ab);
        let mut aba_keys = keys(&aba);
        ab_keys.sort();
        aba_keys.sort();
        prop_assert_eq!(ab_keys, aba_keys);
    }

    #[test]
    fn merged_history_is_newest_first(a in arbitrary_page(), b in arbitrary_page()) {
        let merged = merge_history_page(Some(&a), &b);
        for pair in merged.records().windows(2) {
            prop_assert!(pair[0].start_date >= pair[1].start_date);
        }
    }

    #[test]
    fn merged_history_has_unique_keys(a in arbitrary_page(), b in arbitrary_page()) {
        let merged = merge_history_page(Some(&a), &b);
        let mut seen = keys(&merged);
        let total = seen.len();
        seen.sort();
        seen.dedup();
        prop_assert_eq!(seen.len(), total);
    }

    #[test]
    fn project_is_deterministic(
        snapshot in arbitrary_snapshot(),
        user in arbitrary_user(),
        page in prop::option::of(arbitrary_page()),
        revealed in any::<bool>(),
    ) {
        let decision = evaluate(&snapshot, &user);
        let flags = SessionFlags { password_revealed: revealed };

        let first = project(&snapshot, &decision, page.as_ref(), &flags);
        let second = project(&snapshot, &decision, page.as_ref(), &flags);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sections_keep_fixed_order_and_are_never_empty(
        snapshot in arbitrary_snapshot(),
        user in arbitrary_user(),
        page in prop::option::of(arbitrary_page()),
    ) {
        let decision = evaluate(&snapshot, &user);
        let sections = project(&snapshot, &decision, page.as_ref(), &SessionFlags::default());

        let kinds: Vec<SectionKind> = sections.iter().map(|s| s.kind).collect();
        for pair in kinds.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for section in &sections {
            prop_assert!(!section.rows.is_empty());
        }
    }

    #[test]
    fn identity_section_always_first(
        snapshot in arbitrary_snapshot(),
        user in arbitrary_user(),
    ) {
        let decision = evaluate(&snapshot, &user);
        let sections = project(&snapshot, &decision, None, &SessionFlags::default());
        prop_assert_eq!(sections.first().map(|s| s.kind), Some(SectionKind::Identity));
    }
}
