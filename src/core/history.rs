//! Checkout history paging.
//!
//! History arrives from the equipment service one page at a time, most
//! recent first. Pages are immutable values: merging returns a new page and
//! never touches its inputs.

use super::model::HoldRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Position of the oldest record seen so far, used to request older pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryCursor {
    /// Start date of the oldest loaded record
    pub before: DateTime<Utc>,
    /// Holder of the oldest loaded record, for tie-breaking
    pub holder_id: String,
}

/// Ordered slice of checkout history.
///
/// Records are kept in descending `start_date` order with ties broken by
/// holder id, so two pages holding the same records always compare equal.
///
/// # Example
///
/// ```rust
/// use equipment_checkout::core::{merge_history_page, HistoryPage, HoldRecord};
/// use chrono::{Duration, Utc};
///
/// let now = Utc::now();
/// let first = HistoryPage::new(
///     vec![HoldRecord::active("u1", "Ada", now, None)],
///     true,
/// );
/// let older = HistoryPage::new(
///     vec![HoldRecord::active("u2", "Grace", now - Duration::days(3), None).closed_at(now)],
///     false,
/// );
///
/// let merged = merge_history_page(Some(&first), &older);
/// assert_eq!(merged.records().len(), 2);
/// assert!(!merged.has_more());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryPage {
    records: Vec<HoldRecord>,
    has_more: bool,
}

/// Total order on history records: newest first, then by holder id.
fn history_order(a: &HoldRecord, b: &HoldRecord) -> Ordering {
    b.start_date
        .cmp(&a.start_date)
        .then_with(|| a.holder_id.cmp(&b.holder_id))
}

type RecordKey = (String, DateTime<Utc>);

fn record_key(record: &HoldRecord) -> RecordKey {
    (record.holder_id.clone(), record.start_date)
}

/// Sort and drop repeated `(holder_id, start_date)` keys, keeping the last
/// occurrence of each key.
fn normalize(records: Vec<HoldRecord>) -> Vec<HoldRecord> {
    let mut latest: HashMap<RecordKey, HoldRecord> = HashMap::with_capacity(records.len());
    for record in records {
        latest.insert(record_key(&record), record);
    }
    let mut records: Vec<HoldRecord> = latest.into_values().collect();
    records.sort_by(history_order);
    records
}

impl HistoryPage {
    /// Create a page, normalizing record order and removing duplicates.
    pub fn new(records: Vec<HoldRecord>, has_more: bool) -> Self {
        Self {
            records: normalize(records),
            has_more,
        }
    }

    /// Empty page with no older history upstream.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[HoldRecord] {
        &self.records
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cursor for the next older page.
    ///
    /// `None` when upstream has no more history, or when the page is empty
    /// and the next fetch should start from the newest record.
    pub fn next_cursor(&self) -> Option<HistoryCursor> {
        if !self.has_more {
            return None;
        }
        self.records.last().map(|oldest| HistoryCursor {
            before: oldest.start_date,
            holder_id: oldest.holder_id.clone(),
        })
    }
}

/// Merge a newly fetched page into the history loaded so far.
///
/// Records sharing `(holder_id, start_date)` are de-duplicated, with the
/// version from `new_page` winning since it is the fresher read. `has_more`
/// always comes from `new_page`. Merging the same page twice gives the same
/// result as merging it once.
pub fn merge_history_page(existing: Option<&HistoryPage>, new_page: &HistoryPage) -> HistoryPage {
    let mut records = existing
        .map(|page| page.records.clone())
        .unwrap_or_default();
    records.extend(new_page.records.iter().cloned());

    let merged = HistoryPage {
        records: normalize(records),
        has_more: new_page.has_more,
    };

    tracing::debug!(
        existing = existing.map_or(0, |page| page.records.len()),
        incoming = new_page.records.len(),
        merged = merged.records.len(),
        has_more = merged.has_more,
        "merged history page"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn closed(holder: &str, start: i64, end: i64) -> HoldRecord {
        HoldRecord::active(holder, holder, day(start), Some(day(end))).closed_at(day(end))
    }

    #[test]
    fn new_page_orders_newest_first() {
        let page = HistoryPage::new(
            vec![closed("a", 1, 2), closed("b", 5, 6), closed("c", 3, 4)],
            false,
        );
        let starts: Vec<_> = page.records().iter().map(|r| r.start_date).collect();
        assert_eq!(starts, vec![day(5), day(3), day(1)]);
    }

    #[test]
    fn ties_are_broken_by_holder_id() {
        let page = HistoryPage::new(vec![closed("zed", 1, 2), closed("amy", 1, 3)], false);
        let holders: Vec<_> = page.records().iter().map(|r| r.holder_id.as_str()).collect();
        assert_eq!(holders, vec!["amy", "zed"]);
    }

    #[test]
    fn merge_appends_older_records() {
        let first = HistoryPage::new(vec![closed("a", 9, 10), closed("b", 7, 8)], true);
        let second = HistoryPage::new(vec![closed("c", 3, 4)], false);

        let merged = merge_history_page(Some(&first), &second);

        assert_eq!(merged.records().len(), 3);
        assert_eq!(merged.records()[2].holder_id, "c");
        assert!(!merged.has_more());
    }

    #[test]
    fn merge_without_existing_page_normalizes_new_page() {
        let page = HistoryPage::new(vec![closed("a", 1, 2)], true);
        let merged = merge_history_page(None, &page);
        assert_eq!(merged, page);
    }

    #[test]
    fn merge_is_idempotent() {
        let first = HistoryPage::new(vec![closed("a", 9, 10)], true);
        let second = HistoryPage::new(vec![closed("b", 3, 4), closed("a", 9, 10)], false);

        let once = merge_history_page(Some(&first), &second);
        let twice = merge_history_page(Some(&once), &second);

        assert_eq!(once, twice);
    }

    #[test]
    fn merge_prefers_fresher_duplicate() {
        let active = HoldRecord::active("a", "a", day(1), Some(day(4)));
        let existing = HistoryPage::new(vec![active.clone()], true);
        let fresh = HistoryPage::new(vec![active.closed_at(day(3))], false);

        let merged = merge_history_page(Some(&existing), &fresh);

        assert_eq!(merged.records().len(), 1);
        assert_eq!(merged.records()[0].end_date, Some(day(3)));
    }

    #[test]
    fn merge_does_not_mutate_inputs() {
        let first = HistoryPage::new(vec![closed("a", 9, 10)], true);
        let second = HistoryPage::new(vec![closed("b", 3, 4)], false);

        let _ = merge_history_page(Some(&first), &second);

        assert_eq!(first.records().len(), 1);
        assert!(first.has_more());
        assert_eq!(second.records().len(), 1);
    }

    #[test]
    fn next_cursor_points_at_oldest_record() {
        let page = HistoryPage::new(vec![closed("a", 9, 10), closed("b", 2, 3)], true);
        assert_eq!(
            page.next_cursor(),
            Some(HistoryCursor {
                before: day(2),
                holder_id: "b".to_string(),
            })
        );
    }

    #[test]
    fn next_cursor_is_none_when_exhausted_or_empty() {
        let exhausted = HistoryPage::new(vec![closed("a", 9, 10)], false);
        assert!(exhausted.next_cursor().is_none());

        let empty = HistoryPage::new(Vec::new(), true);
        assert!(empty.next_cursor().is_none());
        assert!(HistoryPage::empty().is_empty());
    }

    #[test]
    fn page_serializes_correctly() {
        let page = HistoryPage::new(vec![closed("a", 1, 2)], true);
        let json = serde_json::to_string(&page).unwrap();
        let deserialized: HistoryPage = serde_json::from_str(&json).unwrap();
        assert_eq!(page, deserialized);
    }
}
