//! Rendering collaborator seam.
//!
//! Frontends implement `TranscriptView`; the controller drives it and never
//! touches a UI framework directly. The view owns actual rendering,
//! scrolling, and styling.

use crate::options::OptionSet;
use crate::transcript::Turn;
use crate::validate::ValidationMode;

/// UI-side sink for transcript and affordance changes. Purely presentational
/// hooks default to no-ops so minimal frontends can skip them.
pub trait TranscriptView {
    /// A turn was appended to the transcript.
    fn append(&mut self, turn: &Turn);

    /// Mount options below the latest assistant turn. The controller always
    /// unmounts any previous set first.
    fn mount_options(&mut self, options: &OptionSet);

    /// Remove the currently mounted options.
    fn unmount_options(&mut self);

    /// Show the "assistant is responding" marker after the last turn.
    fn show_indicator(&mut self);

    /// Remove the marker. Idempotent.
    fn clear_indicator(&mut self);

    /// Show the reset confirmation's two mutually exclusive controls.
    fn mount_confirmation_controls(&mut self, confirm_label: &str, cancel_label: &str);

    /// Remove the confirmation controls. Idempotent.
    fn remove_confirmation_controls(&mut self);

    /// One-time visual emphasis on the transcript's last message
    /// (booking confirmed). Presentation hint only.
    fn emphasize_last(&mut self) {}

    /// Enable or disable the input affordances (text field and buttons).
    fn set_input_enabled(&mut self, enabled: bool);

    /// Return focus to the text input after a turn completes.
    fn focus_input(&mut self) {}

    /// The active input-filtering policy changed.
    fn validation_changed(&mut self, _mode: ValidationMode) {}
}
