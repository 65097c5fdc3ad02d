//! Option derivation: map a backend reply's `type` tag to the selectable
//! options the widget offers after that reply.
//!
//! The table here is the single source of truth for which tags produce
//! buttons and what each button submits. Unknown or absent tags fall through
//! to free-text input. At most one option set is live at a time; the
//! controller always retires the previous set before mounting a new one.

use crate::protocol::BackendReply;

/// Known reply tags plus an explicit catch-all. Only the six selection
/// variants ever produce options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Menu,
    BloodGroupSelection,
    GenderSelection,
    DoctorSelection,
    DateSelection,
    TimeSelection,
    BookingConfirmed,
    TextInput,
    BookingDetails,
    Error,
    EndConfirmation,
    Unknown,
}

impl ReplyKind {
    /// Map the wire tag to a known kind. Absent and unrecognized tags are
    /// `Unknown` (never a guess).
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("menu") => ReplyKind::Menu,
            Some("blood_group_selection") => ReplyKind::BloodGroupSelection,
            Some("gender_selection") => ReplyKind::GenderSelection,
            Some("doctor_selection") => ReplyKind::DoctorSelection,
            Some("date_selection") => ReplyKind::DateSelection,
            Some("time_selection") => ReplyKind::TimeSelection,
            Some("booking_confirmed") => ReplyKind::BookingConfirmed,
            Some("text_input") => ReplyKind::TextInput,
            Some("booking_details") => ReplyKind::BookingDetails,
            Some("error") => ReplyKind::Error,
            Some("end_confirmation") => ReplyKind::EndConfirmation,
            _ => ReplyKind::Unknown,
        }
    }
}

/// One selectable option: the label the user sees, the value sent to the
/// backend on selection, and an optional subtitle line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub label: String,
    pub value: String,
    pub subtitle: Option<String>,
}

impl OptionItem {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(
        label: impl Into<String>,
        value: impl Into<String>,
        subtitle: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            subtitle: Some(subtitle.into()),
        }
    }
}

/// The currently offered options. Replaced wholesale on the next turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    pub items: Vec<OptionItem>,
    /// Rendering hint for frontends: "menu", "grid", "row", or "list".
    pub layout_hint: &'static str,
}

/// Entry-state menu, offered on open and after a session reset. Labels are
/// what the user sees; values are the exact strings the backend dispatches on.
pub fn menu_options() -> OptionSet {
    OptionSet {
        items: vec![
            OptionItem::new("Check Booking", "Check booking"),
            OptionItem::new("Book Appointment", "Book appointment"),
        ],
        layout_hint: "menu",
    }
}

/// Derive the options (if any) for a reply. Selection tags whose payload
/// array is missing or empty produce nothing rather than an error.
pub fn derive_options(reply: &BackendReply) -> Option<OptionSet> {
    let set = match ReplyKind::from_tag(reply.typ.as_deref()) {
        ReplyKind::Menu => menu_options(),
        ReplyKind::BloodGroupSelection => OptionSet {
            items: reply
                .options
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(|o| OptionItem::new(o.clone(), o.clone()))
                .collect(),
            layout_hint: "grid",
        },
        ReplyKind::GenderSelection => OptionSet {
            items: ["Male", "Female", "Other"]
                .iter()
                .map(|g| OptionItem::new(*g, *g))
                .collect(),
            layout_hint: "row",
        },
        ReplyKind::DoctorSelection => OptionSet {
            items: reply
                .doctors
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    OptionItem::with_subtitle(
                        format!("{}. {}", i + 1, d.name),
                        (i + 1).to_string(),
                        format!(
                            "{} - {}",
                            d.specialty,
                            d.availability.as_deref().unwrap_or("Available")
                        ),
                    )
                })
                .collect(),
            layout_hint: "list",
        },
        ReplyKind::DateSelection => OptionSet {
            items: reply
                .dates
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    OptionItem::with_subtitle(
                        format!("{}. {}", i + 1, d.display_name),
                        (i + 1).to_string(),
                        format!("{} slots available", d.total_available_slots),
                    )
                })
                .collect(),
            layout_hint: "list",
        },
        ReplyKind::TimeSelection => OptionSet {
            items: reply
                .time_slots
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .enumerate()
                .map(|(i, t)| OptionItem::new(format!("{}. {}", i + 1, t.time), (i + 1).to_string()))
                .collect(),
            layout_hint: "list",
        },
        _ => return None,
    };
    if set.items.is_empty() {
        None
    } else {
        Some(set)
    }
}
