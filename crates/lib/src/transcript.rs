//! Append-only transcript of conversation turns.
//!
//! The store is the model the frontends render from. Turns are never mutated
//! or removed once appended; the transient "assistant is responding"
//! indicator and the reset-confirmation controls are the only ephemeral
//! elements and live alongside the log, not inside it.

use chrono::{DateTime, Utc};

/// Who produced a turn. Errors are always surfaced on the assistant side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One transcript entry. Immutable once appended; ordering is append order.
/// Newlines in `text` are stored raw; rendering them is the view's job.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant_error(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            is_error: true,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered log of turns plus the two ephemeral elements.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    turns: Vec<Turn>,
    indicator: bool,
    confirmation_controls: bool,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn at the end. Prior turns are never touched.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Show the in-progress marker. At most one exists; it renders after the
    /// last turn until cleared.
    pub fn show_indicator(&mut self) {
        self.indicator = true;
    }

    /// Clear the in-progress marker. Idempotent: a no-op when absent.
    pub fn clear_indicator(&mut self) {
        self.indicator = false;
    }

    pub fn indicator_visible(&self) -> bool {
        self.indicator
    }

    pub(crate) fn mount_confirmation_controls(&mut self) {
        self.confirmation_controls = true;
    }

    /// Strip the reset-confirmation controls. Idempotent: a no-op when none
    /// are mounted.
    pub fn remove_confirmation_controls(&mut self) {
        self.confirmation_controls = false;
    }

    pub fn confirmation_controls_mounted(&self) -> bool {
        self.confirmation_controls
    }
}
