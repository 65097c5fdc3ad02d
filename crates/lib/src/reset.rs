//! Reset sub-dialog: the "end" sentinel, its confirmation controls, and the
//! local fallback used when the reset turn cannot reach the backend.

use std::time::Duration;

/// Free-text value intercepted client-side; never sent as a user message.
pub const END_SENTINEL: &str = "end";

/// Message sent to the backend to return the conversation to its entry state.
pub const RESET_COMMAND: &str = "reset_to_menu";

/// Confirmation prompt appended when the sentinel is intercepted.
pub const CONFIRM_PROMPT: &str =
    "Are you sure you want to go back to the main menu? This will end your current session.";

pub const CONFIRM_LABEL: &str = "Yes, go to menu";
pub const CANCEL_LABEL: &str = "No, continue";

/// Fixed acknowledgment appended when the user cancels; no backend call.
pub const CANCEL_ACK: &str = "Okay, let's continue where we left off.";

/// Shown in place of the backend's menu reply when the reset turn fails; the
/// entry menu is injected after `RESET_FALLBACK_DELAY` so the user always has
/// navigable options, even with the backend unreachable.
pub const RESET_FALLBACK_MESSAGE: &str = "🏥 Back to Main Menu! 🏥\n\nI can help you with:\n• Check your existing booking details with unique code\n• Book a new doctor's appointment\n\nPlease select an option below:";

pub const RESET_FALLBACK_DELAY: Duration = Duration::from_millis(600);

/// The user's decision on the pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetChoice {
    /// End the session and return to the entry menu.
    GoToMenu,
    /// Keep the current conversation.
    Continue,
}

/// True when the trimmed input equals the "end" sentinel, any letter case.
pub fn is_end_sentinel(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(END_SENTINEL)
}
