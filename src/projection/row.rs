//! Display sections and rows.
//!
//! Rows carry domain data only. Mapping a row to a cell identifier, colour
//! or date format belongs to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Caller-owned display toggles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SessionFlags {
    pub password_revealed: bool,
}

impl SessionFlags {
    pub fn toggle_password(&mut self) {
        self.password_revealed = !self.password_revealed;
    }
}

/// The fixed set of sections, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SectionKind {
    Identity,
    ReturnDate,
    Notes,
    History,
    Holders,
    Actions,
}

impl SectionKind {
    pub fn title(&self) -> Option<&'static str> {
        match self {
            Self::Identity | Self::ReturnDate => None,
            Self::Notes => Some("Notes"),
            Self::History => Some("History"),
            Self::Holders => Some("Members checking out"),
            Self::Actions => Some("Actions"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: Option<String>,
    pub rows: Vec<RowDescriptor>,
}

impl Section {
    pub(crate) fn new(kind: SectionKind, rows: Vec<RowDescriptor>) -> Self {
        Self {
            kind,
            title: kind.title().map(str::to_string),
            rows,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NoteField {
    Make,
    Model,
    SerialNumber,
}

impl NoteField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Make => "Make",
            Self::Model => "Model",
            Self::SerialNumber => "Serial Number",
        }
    }
}

/// Whether a history row is still open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum HistoryTag {
    Current,
    Past,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Return,
    CheckOut,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum RowDescriptor {
    Identity {
        equipment_id: String,
        name: String,
        icon_key: Option<String>,
        detail: String,
    },
    ReturnDate {
        current: DateTime<Utc>,
    },
    /// `text` is the password itself when revealed, otherwise a mask of
    /// the same character count
    Password {
        text: String,
        revealed: bool,
    },
    Note {
        field: NoteField,
        value: String,
    },
    Hold {
        tag: HistoryTag,
        holder_name: String,
        start_date: DateTime<Utc>,
        expected_return_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    },
    LoadMore,
    Holder {
        holder_id: String,
        holder_name: String,
        count: usize,
        /// "x<count>" when the holder has more than one slot
        occurrence_label: Option<String>,
    },
    Action {
        action: ActionKind,
        enabled: bool,
    },
}
