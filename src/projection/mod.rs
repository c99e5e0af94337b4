//! View projection.
//!
//! [`project`] maps an equipment snapshot, the engine's decision, the loaded
//! history and the caller's session flags to an ordered list of sections.
//! It is referentially transparent: equal inputs give equal output, so the
//! section list can be compared directly in tests.

mod row;

pub use row::{
    ActionKind, HistoryTag, NoteField, RowDescriptor, Section, SectionKind, SessionFlags,
};

use crate::core::{Decision, EquipmentKind, EquipmentSnapshot, HistoryPage, HoldRecord, Occupancy};

const PASSWORD_MASK: char = '●';

/// Build the display sections for an item.
///
/// Sections always appear in [`SectionKind`] order and empty sections are
/// left out.
pub fn project(
    snapshot: &EquipmentSnapshot,
    decision: &Decision,
    history: Option<&HistoryPage>,
    flags: &SessionFlags,
) -> Vec<Section> {
    [
        (SectionKind::Identity, vec![identity_row(snapshot)]),
        (SectionKind::ReturnDate, return_date_rows(snapshot, decision)),
        (SectionKind::Notes, note_rows(snapshot, flags)),
        (SectionKind::History, history_rows(snapshot, history)),
        (SectionKind::Holders, holder_rows(snapshot)),
        (SectionKind::Actions, action_rows(decision)),
    ]
    .into_iter()
    .filter(|(_, rows)| !rows.is_empty())
    .map(|(kind, rows)| Section::new(kind, rows))
    .collect()
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn identity_row(snapshot: &EquipmentSnapshot) -> RowDescriptor {
    let mut details = Vec::new();
    if let Some(description) = non_empty(&snapshot.description) {
        details.push(description.to_string());
    } else if let (Some(make), Some(model)) =
        (non_empty(&snapshot.make), non_empty(&snapshot.model))
    {
        details.push(format!("{make} {model}"));
    }
    match non_empty(&snapshot.serial_number) {
        Some(serial) => details.push(format!("SN: {serial}")),
        None => details.push(format!("ID: {}", snapshot.id)),
    }

    RowDescriptor::Identity {
        equipment_id: snapshot.id.clone(),
        name: snapshot.name.clone(),
        icon_key: snapshot.icon_name.clone(),
        detail: details.join(" | "),
    }
}

fn return_date_rows(snapshot: &EquipmentSnapshot, decision: &Decision) -> Vec<RowDescriptor> {
    if decision.effective_occupancy != Occupancy::HeldBySelf {
        return Vec::new();
    }
    snapshot
        .sole_singleton_hold()
        .and_then(|hold| hold.expected_return_date)
        .map(|current| RowDescriptor::ReturnDate { current })
        .into_iter()
        .collect()
}

fn note_rows(snapshot: &EquipmentSnapshot, flags: &SessionFlags) -> Vec<RowDescriptor> {
    let mut rows = Vec::new();

    if let Some(password) = non_empty(&snapshot.password) {
        let text = if flags.password_revealed {
            password.to_string()
        } else {
            std::iter::repeat(PASSWORD_MASK)
                .take(password.chars().count())
                .collect()
        };
        rows.push(RowDescriptor::Password {
            text,
            revealed: flags.password_revealed,
        });
    }

    let notes = [
        (NoteField::Make, &snapshot.make),
        (NoteField::Model, &snapshot.model),
        (NoteField::SerialNumber, &snapshot.serial_number),
    ];
    for (field, value) in notes {
        if let Some(value) = non_empty(value) {
            rows.push(RowDescriptor::Note {
                field,
                value: value.to_string(),
            });
        }
    }

    rows
}

fn hold_row(record: &HoldRecord) -> RowDescriptor {
    RowDescriptor::Hold {
        tag: if record.is_active() {
            HistoryTag::Current
        } else {
            HistoryTag::Past
        },
        holder_name: record.holder_name.clone(),
        start_date: record.start_date,
        expected_return_date: record.expected_return_date,
        end_date: record.end_date,
    }
}

fn history_rows(snapshot: &EquipmentSnapshot, history: Option<&HistoryPage>) -> Vec<RowDescriptor> {
    match history {
        Some(page) => {
            let mut rows: Vec<RowDescriptor> = page.records().iter().map(hold_row).collect();
            if page.has_more() {
                rows.push(RowDescriptor::LoadMore);
            }
            rows
        }
        None => {
            // Nothing loaded yet: one row from the latest known hold, then
            // the first-touch pagination row.
            let latest = snapshot.last_hold.as_ref().or_else(|| {
                snapshot
                    .active_holds()
                    .max_by(|a, b| a.start_date.cmp(&b.start_date))
            });
            match latest {
                Some(record) => vec![hold_row(record), RowDescriptor::LoadMore],
                None => Vec::new(),
            }
        }
    }
}

fn holder_rows(snapshot: &EquipmentSnapshot) -> Vec<RowDescriptor> {
    if snapshot.kind != EquipmentKind::Collection {
        return Vec::new();
    }

    // First-appearance order keeps the output deterministic.
    let mut counted: Vec<(&HoldRecord, usize)> = Vec::new();
    for hold in snapshot.active_holds() {
        match counted
            .iter_mut()
            .find(|(seen, _)| seen.holder_id == hold.holder_id)
        {
            Some((_, count)) => *count += 1,
            None => counted.push((hold, 1)),
        }
    }

    counted
        .into_iter()
        .map(|(hold, count)| RowDescriptor::Holder {
            holder_id: hold.holder_id.clone(),
            holder_name: hold.holder_name.clone(),
            count,
            occurrence_label: (count > 1).then(|| format!("x{count}")),
        })
        .collect()
}

fn action_rows(decision: &Decision) -> Vec<RowDescriptor> {
    let mut rows = Vec::new();
    if decision.can_return {
        rows.push(RowDescriptor::Action {
            action: ActionKind::Return,
            enabled: true,
        });
    }
    if decision.effective_occupancy != Occupancy::HeldBySelf {
        rows.push(RowDescriptor::Action {
            action: ActionKind::CheckOut,
            enabled: decision.can_checkout,
        });
    }
    rows
}
