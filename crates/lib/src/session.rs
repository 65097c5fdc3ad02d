//! Widget session identity and lifecycle state.
//!
//! One `WidgetSession` exists per process: created at startup, mutated only
//! by the controller's named transitions, never reset mid-run. The session
//! id is an opaque correlation token for the backend, not a security
//! boundary.

use crate::validate::ValidationMode;

/// Turn state. Input affordances are disabled exactly while `AwaitingReply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingReply,
}

/// Generate a fresh opaque session id, unique enough for backend correlation.
pub fn new_session_id() -> String {
    format!("web-{}", uuid::Uuid::new_v4())
}

/// Process-wide widget state: session id plus the mutable flags the
/// conversation protocol depends on.
#[derive(Debug, Clone)]
pub struct WidgetSession {
    id: String,
    state: TurnState,
    validation: ValidationMode,
    pending_confirmation: bool,
}

impl Default for WidgetSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetSession {
    pub fn new() -> Self {
        Self {
            id: new_session_id(),
            state: TurnState::Idle,
            validation: ValidationMode::None,
            pending_confirmation: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: TurnState) {
        self.state = state;
    }

    pub fn validation(&self) -> ValidationMode {
        self.validation
    }

    /// Replace the active validation mode. A single assignment: the previous
    /// mode's filter and length cap are gone before the new one applies, so
    /// two filters are never active at once.
    pub fn set_validation_mode(&mut self, mode: ValidationMode) {
        self.validation = mode;
    }

    /// True between the "end" sentinel and the user's confirm/cancel choice.
    pub fn pending_confirmation(&self) -> bool {
        self.pending_confirmation
    }

    pub(crate) fn set_pending_confirmation(&mut self, pending: bool) {
        self.pending_confirmation = pending;
    }
}
