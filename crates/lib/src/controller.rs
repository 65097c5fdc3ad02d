//! Turn orchestration: one full request/response turn, the affordances
//! offered after each reply, and the reset sub-dialog.
//!
//! The widget is single-threaded and event-driven: the backend call is the
//! only suspension point, and input affordances are disabled for exactly
//! that window, so at most one turn is ever in flight per session. Failures
//! are converted to error-flagged transcript turns at this boundary and
//! never propagate; the next input starts a fresh turn normally.

use crate::backend::{BackendError, ChatTransport};
use crate::options::{self, OptionSet, ReplyKind};
use crate::protocol::BackendReply;
use crate::reset::{self, ResetChoice};
use crate::session::{TurnState, WidgetSession};
use crate::transcript::{TranscriptStore, Turn};
use crate::validate;
use crate::view::TranscriptView;

/// Fixed assistant text for transport-level failures.
pub const CONNECT_ERROR_MESSAGE: &str =
    "Sorry, I'm having trouble connecting right now. Please try again in a moment.";

/// Greeting appended locally when the widget opens. Mirrors the backend's
/// own menu message so the entry state reads the same either way.
const WELCOME_MESSAGE: &str = "🏥 Welcome to Medical Chatbot! 🏥\n\nI can help you with:\n• Check your existing booking details with unique code\n• Book a new doctor's appointment\n\nPlease select an option below:";

/// The conversational widget: transcript, live options, session state, and
/// the turn state machine, wired to a transport and a rendering view.
pub struct ChatWidget<T: ChatTransport, V: TranscriptView> {
    session: WidgetSession,
    transcript: TranscriptStore,
    live_options: Option<OptionSet>,
    transport: T,
    view: V,
}

impl<T: ChatTransport, V: TranscriptView> ChatWidget<T, V> {
    pub fn new(transport: T, view: V) -> Self {
        Self {
            session: WidgetSession::new(),
            transcript: TranscriptStore::new(),
            live_options: None,
            transport,
            view,
        }
    }

    pub fn session(&self) -> &WidgetSession {
        &self.session
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn live_options(&self) -> Option<&OptionSet> {
        self.live_options.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Open the widget: append the greeting and mount the entry menu. No
    /// backend call is made; the first real turn happens on user input.
    pub fn open(&mut self) {
        log::info!("widget: session {} opened", self.session.id());
        self.append_turn(Turn::assistant(WELCOME_MESSAGE));
        self.mount_options(options::menu_options());
        self.view.set_input_enabled(true);
        self.view.focus_input();
    }

    /// Submit free text typed by the user. Empty input is silently ignored;
    /// the "end" sentinel opens the reset confirmation without contacting
    /// the backend.
    pub async fn submit_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.session.state() == TurnState::AwaitingReply {
            log::debug!("widget: input ignored while awaiting reply");
            return;
        }
        if reset::is_end_sentinel(text) {
            self.open_reset_confirmation();
            return;
        }
        self.run_turn(text.to_string(), text.to_string()).await;
    }

    /// Submit a selection from the live option set. `value` must be one of
    /// the mounted items' submit values; anything else is ignored.
    pub async fn submit_option(&mut self, value: &str) {
        if self.session.state() == TurnState::AwaitingReply {
            log::debug!("widget: selection ignored while awaiting reply");
            return;
        }
        let label = match self
            .live_options
            .as_ref()
            .and_then(|set| set.items.iter().find(|item| item.value == value))
        {
            Some(item) => item.label.clone(),
            None => {
                log::warn!("widget: selection {:?} does not match a mounted option", value);
                return;
            }
        };
        self.run_turn(value.to_string(), label).await;
    }

    /// Resolve the pending reset confirmation. No-op when none is pending.
    /// Either choice removes both controls immediately.
    pub async fn resolve_confirmation(&mut self, choice: ResetChoice) {
        if !self.session.pending_confirmation() {
            log::debug!("widget: confirmation choice with nothing pending");
            return;
        }
        self.session.set_pending_confirmation(false);
        self.transcript.remove_confirmation_controls();
        self.view.remove_confirmation_controls();

        match choice {
            ResetChoice::Continue => {
                self.append_turn(Turn::user(reset::CANCEL_LABEL));
                self.append_turn(Turn::assistant(reset::CANCEL_ACK));
            }
            ResetChoice::GoToMenu => {
                self.append_turn(Turn::user(reset::CONFIRM_LABEL));
                self.begin_await();
                let session_id = self.session.id().to_string();
                match self.transport.send(reset::RESET_COMMAND, &session_id).await {
                    Ok(reply) => self.finish_turn_ok(reply),
                    Err(e) => {
                        log::warn!("widget: reset turn failed: {}", e);
                        self.transcript.clear_indicator();
                        self.view.clear_indicator();
                        self.append_turn(Turn::assistant(reset::RESET_FALLBACK_MESSAGE));
                        self.end_await();
                        // Deferred menu injection: never leave the user
                        // without navigable options.
                        tokio::time::sleep(reset::RESET_FALLBACK_DELAY).await;
                        self.mount_options(options::menu_options());
                    }
                }
            }
        }
    }

    /// One full turn: append the user's side, call the backend, and render
    /// the reply or the failure. `message` is what the backend receives,
    /// `display` is what the transcript shows (option label vs typed text).
    async fn run_turn(&mut self, message: String, display: String) {
        self.append_turn(Turn::user(display));
        self.begin_await();
        let session_id = self.session.id().to_string();
        match self.transport.send(&message, &session_id).await {
            Ok(reply) => self.finish_turn_ok(reply),
            Err(e) => self.finish_turn_err(e),
        }
    }

    /// Enter `AwaitingReply`: retire the live options, disable input, show
    /// the indicator. Every path out goes through `end_await` exactly once.
    fn begin_await(&mut self) {
        self.unmount_options();
        self.session.set_state(TurnState::AwaitingReply);
        self.view.set_input_enabled(false);
        self.transcript.show_indicator();
        self.view.show_indicator();
    }

    fn end_await(&mut self) {
        self.session.set_state(TurnState::Idle);
        self.view.set_input_enabled(true);
        self.view.focus_input();
    }

    fn finish_turn_ok(&mut self, reply: BackendReply) {
        self.transcript.clear_indicator();
        self.view.clear_indicator();

        let kind = ReplyKind::from_tag(reply.typ.as_deref());
        self.append_turn(Turn::assistant(reply.message.clone()));
        if kind == ReplyKind::BookingConfirmed {
            self.view.emphasize_last();
        }
        if let Some(set) = options::derive_options(&reply) {
            self.mount_options(set);
        }

        let mode = validate::mode_for_prompt(&reply.message);
        self.session.set_validation_mode(mode);
        self.view.validation_changed(mode);

        self.end_await();
    }

    fn finish_turn_err(&mut self, err: BackendError) {
        log::warn!("widget: turn failed: {}", err);
        self.transcript.clear_indicator();
        self.view.clear_indicator();
        let text = match err {
            BackendError::Api(msg) => msg,
            BackendError::Request(_) => CONNECT_ERROR_MESSAGE.to_string(),
        };
        self.append_turn(Turn::assistant_error(text));
        self.end_await();
    }

    fn open_reset_confirmation(&mut self) {
        if self.session.pending_confirmation() {
            return;
        }
        self.session.set_pending_confirmation(true);
        self.append_turn(Turn::assistant(reset::CONFIRM_PROMPT));
        self.transcript.mount_confirmation_controls();
        self.view
            .mount_confirmation_controls(reset::CONFIRM_LABEL, reset::CANCEL_LABEL);
    }

    fn append_turn(&mut self, turn: Turn) {
        self.view.append(&turn);
        self.transcript.append(turn);
    }

    /// Mount a new option set, always retiring any previous one first.
    fn mount_options(&mut self, set: OptionSet) {
        self.unmount_options();
        self.view.mount_options(&set);
        self.live_options = Some(set);
    }

    fn unmount_options(&mut self) {
        if self.live_options.take().is_some() {
            self.view.unmount_options();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionItem;
    use crate::protocol::DoctorSlot;
    use crate::transcript::Speaker;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Transport with scripted replies; records every message it was sent.
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        calls: Arc<Mutex<Vec<String>>>,
        replies: Arc<Mutex<VecDeque<Result<BackendReply, BackendError>>>>,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self::default()
        }

        fn push_ok(&self, reply: BackendReply) {
            self.replies.lock().unwrap().push_back(Ok(reply));
        }

        fn push_err(&self, err: BackendError) {
            self.replies.lock().unwrap().push_back(Err(err));
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(
            &self,
            message: &str,
            _session_id: &str,
        ) -> Result<BackendReply, BackendError> {
            self.calls.lock().unwrap().push(message.to_string());
            self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(BackendReply {
                    message: "ok".to_string(),
                    ..Default::default()
                })
            })
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Append(Speaker, String, bool),
        MountOptions(Vec<String>),
        UnmountOptions,
        ShowIndicator,
        ClearIndicator,
        MountConfirmation,
        RemoveConfirmation,
        EmphasizeLast,
        InputEnabled(bool),
    }

    #[derive(Clone, Default)]
    struct RecordingView {
        events: Arc<Mutex<Vec<ViewEvent>>>,
    }

    impl RecordingView {
        fn events(&self) -> Vec<ViewEvent> {
            self.events.lock().unwrap().clone()
        }

        fn push(&self, ev: ViewEvent) {
            self.events.lock().unwrap().push(ev);
        }
    }

    impl TranscriptView for RecordingView {
        fn append(&mut self, turn: &Turn) {
            self.push(ViewEvent::Append(turn.speaker, turn.text.clone(), turn.is_error));
        }

        fn mount_options(&mut self, options: &OptionSet) {
            let values = options.items.iter().map(|i| i.value.clone()).collect();
            self.push(ViewEvent::MountOptions(values));
        }

        fn unmount_options(&mut self) {
            self.push(ViewEvent::UnmountOptions);
        }

        fn show_indicator(&mut self) {
            self.push(ViewEvent::ShowIndicator);
        }

        fn clear_indicator(&mut self) {
            self.push(ViewEvent::ClearIndicator);
        }

        fn mount_confirmation_controls(&mut self, _confirm: &str, _cancel: &str) {
            self.push(ViewEvent::MountConfirmation);
        }

        fn remove_confirmation_controls(&mut self) {
            self.push(ViewEvent::RemoveConfirmation);
        }

        fn emphasize_last(&mut self) {
            self.push(ViewEvent::EmphasizeLast);
        }

        fn set_input_enabled(&mut self, enabled: bool) {
            self.push(ViewEvent::InputEnabled(enabled));
        }
    }

    fn widget() -> (
        ChatWidget<ScriptedTransport, RecordingView>,
        ScriptedTransport,
        RecordingView,
    ) {
        let transport = ScriptedTransport::new();
        let view = RecordingView::default();
        let w = ChatWidget::new(transport.clone(), view.clone());
        (w, transport, view)
    }

    /// A real reqwest error without any network I/O (unsupported scheme).
    async fn transport_error() -> BackendError {
        let err = reqwest::Client::new()
            .get("ftp://invalid.invalid/")
            .send()
            .await
            .expect_err("ftp scheme must fail");
        BackendError::Request(err)
    }

    fn option_values(set: &OptionSet) -> Vec<&str> {
        set.items.iter().map(|i| i.value.as_str()).collect()
    }

    #[test]
    fn open_appends_greeting_and_mounts_entry_menu() {
        let (mut w, _transport, _view) = widget();
        w.open();
        assert_eq!(w.transcript().len(), 1);
        assert_eq!(w.transcript().last().map(|t| t.speaker), Some(Speaker::Assistant));
        let set = w.live_options().expect("entry menu mounted");
        assert_eq!(option_values(set), ["Check booking", "Book appointment"]);
    }

    #[tokio::test]
    async fn happy_turn_appends_both_sides_and_mounts_menu() {
        let (mut w, transport, view) = widget();
        transport.push_ok(BackendReply {
            typ: Some("menu".to_string()),
            message: "Welcome".to_string(),
            ..Default::default()
        });

        w.submit_text("hello").await;

        let texts: Vec<&str> = w.transcript().turns().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["hello", "Welcome"]);
        assert_eq!(transport.calls(), ["hello"]);
        let set = w.live_options().expect("menu mounted");
        assert_eq!(set.items.len(), 2);

        // Disable/enable bracket around the call, indicator shown then cleared.
        let events = view.events();
        let position = |ev: ViewEvent| {
            events
                .iter()
                .position(|e| *e == ev)
                .unwrap_or_else(|| panic!("missing event {:?}", ev))
        };
        let disabled = position(ViewEvent::InputEnabled(false));
        let cleared = position(ViewEvent::ClearIndicator);
        let enabled = position(ViewEvent::InputEnabled(true));
        assert!(disabled < cleared && cleared < enabled);
        assert!(!w.transcript().indicator_visible());
        assert_eq!(w.session().state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn option_selection_sends_declared_value_and_shows_label() {
        let (mut w, transport, _view) = widget();
        w.open();

        w.submit_option("Book appointment").await;

        assert_eq!(transport.calls(), ["Book appointment"]);
        // The user-visible turn carries the label, not the submit value.
        assert_eq!(w.transcript().turns()[1].text, "Book Appointment");
        assert_eq!(w.transcript().turns()[1].speaker, Speaker::User);
    }

    #[tokio::test]
    async fn unmatched_option_value_is_ignored() {
        let (mut w, transport, _view) = widget();
        w.open();
        let before = w.transcript().len();

        w.submit_option("42").await;

        assert!(transport.calls().is_empty());
        assert_eq!(w.transcript().len(), before);
    }

    #[tokio::test]
    async fn empty_input_is_silently_ignored() {
        let (mut w, transport, _view) = widget();
        w.submit_text("   \n").await;
        assert!(transport.calls().is_empty());
        assert!(w.transcript().is_empty());
    }

    #[tokio::test]
    async fn end_sentinel_never_reaches_the_backend() {
        let (mut w, transport, view) = widget();
        w.submit_text("  END ").await;

        assert!(transport.calls().is_empty());
        assert!(w.session().pending_confirmation());
        assert!(w.transcript().confirmation_controls_mounted());
        assert_eq!(
            w.transcript().last().map(|t| t.text.as_str()),
            Some(reset::CONFIRM_PROMPT)
        );
        assert!(view.events().contains(&ViewEvent::MountConfirmation));
    }

    #[tokio::test]
    async fn cancel_appends_two_turns_and_no_backend_call() {
        let (mut w, transport, view) = widget();
        w.submit_text("end").await;
        let before = w.transcript().len();

        w.resolve_confirmation(ResetChoice::Continue).await;

        assert_eq!(w.transcript().len(), before + 2);
        assert_eq!(w.transcript().turns()[before].text, reset::CANCEL_LABEL);
        assert_eq!(w.transcript().last().map(|t| t.text.as_str()), Some(reset::CANCEL_ACK));
        assert!(transport.calls().is_empty());
        assert!(!w.session().pending_confirmation());
        assert!(!w.transcript().confirmation_controls_mounted());
        assert!(view.events().contains(&ViewEvent::RemoveConfirmation));
    }

    #[tokio::test]
    async fn confirm_sends_reset_command_and_renders_backend_menu() {
        let (mut w, transport, _view) = widget();
        transport.push_ok(BackendReply {
            typ: Some("menu".to_string()),
            message: "Back to Main Menu!".to_string(),
            ..Default::default()
        });
        w.submit_text("end").await;

        w.resolve_confirmation(ResetChoice::GoToMenu).await;

        assert_eq!(transport.calls(), [reset::RESET_COMMAND]);
        assert_eq!(
            w.transcript().last().map(|t| t.text.as_str()),
            Some("Back to Main Menu!")
        );
        let set = w.live_options().expect("menu from backend reply");
        assert_eq!(option_values(set), ["Check booking", "Book appointment"]);
        assert_eq!(w.session().state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn reset_transport_failure_falls_back_to_local_menu() {
        let (mut w, transport, _view) = widget();
        transport.push_err(transport_error().await);
        w.submit_text("end").await;

        w.resolve_confirmation(ResetChoice::GoToMenu).await;

        let last = w.transcript().last().expect("fallback turn");
        assert_eq!(last.text, reset::RESET_FALLBACK_MESSAGE);
        assert!(!last.is_error);
        let set = w.live_options().expect("locally injected menu");
        assert_eq!(option_values(set), ["Check booking", "Book appointment"]);
        assert_eq!(w.session().state(), TurnState::Idle);
    }

    #[tokio::test]
    async fn resolving_without_pending_confirmation_is_a_noop() {
        let (mut w, transport, _view) = widget();
        w.resolve_confirmation(ResetChoice::GoToMenu).await;
        assert!(transport.calls().is_empty());
        assert!(w.transcript().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_appends_generic_error_and_reenables_input() {
        let (mut w, transport, view) = widget();
        transport.push_err(transport_error().await);

        w.submit_text("hi").await;

        let last = w.transcript().last().expect("error turn");
        assert!(last.is_error);
        assert_eq!(last.text, CONNECT_ERROR_MESSAGE);
        assert_eq!(
            view.events().last(),
            // end_await re-enables input as the final step
            Some(&ViewEvent::InputEnabled(true))
        );
        assert!(!w.transcript().indicator_visible());
    }

    #[tokio::test]
    async fn rejected_reply_surfaces_backend_error_verbatim() {
        let (mut w, transport, _view) = widget();
        transport.push_err(BackendError::Api("Message cannot be empty".to_string()));

        w.submit_text("hi").await;

        let last = w.transcript().last().expect("error turn");
        assert!(last.is_error);
        assert_eq!(last.text, "Message cannot be empty");
        // The widget stays usable: the next turn proceeds normally.
        transport.push_ok(BackendReply {
            message: "recovered".to_string(),
            ..Default::default()
        });
        w.submit_text("again").await;
        assert_eq!(w.transcript().last().map(|t| t.text.as_str()), Some("recovered"));
    }

    #[tokio::test]
    async fn mounting_new_options_retires_the_previous_set_first() {
        let (mut w, transport, view) = widget();
        w.open();
        transport.push_ok(BackendReply {
            typ: Some("doctor_selection".to_string()),
            message: "Please select a doctor".to_string(),
            doctors: Some(vec![DoctorSlot {
                name: "Dr. A".to_string(),
                specialty: "Cardio".to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        });

        w.submit_option("Book appointment").await;

        let mounts: Vec<ViewEvent> = view
            .events()
            .into_iter()
            .filter(|e| matches!(e, ViewEvent::MountOptions(_) | ViewEvent::UnmountOptions))
            .collect();
        assert_eq!(mounts.len(), 3);
        assert!(matches!(mounts[0], ViewEvent::MountOptions(_)));
        assert_eq!(mounts[1], ViewEvent::UnmountOptions);
        assert!(matches!(mounts[2], ViewEvent::MountOptions(_)));

        let set = w.live_options().expect("doctor options");
        assert_eq!(option_values(set), ["1"]);
        assert_eq!(set.items[0].label, "1. Dr. A");
    }

    #[tokio::test]
    async fn booking_confirmation_emphasizes_the_last_bubble() {
        let (mut w, transport, view) = widget();
        transport.push_ok(BackendReply {
            typ: Some("booking_confirmed".to_string()),
            message: "✅ Appointment Confirmed!".to_string(),
            unique_code: Some("12345678".to_string()),
            ..Default::default()
        });

        w.submit_text("1").await;

        assert!(view.events().contains(&ViewEvent::EmphasizeLast));
        assert!(w.live_options().is_none());
    }

    #[tokio::test]
    async fn validation_gate_reruns_on_every_reply() {
        let (mut w, transport, _view) = widget();
        transport.push_ok(BackendReply {
            message: "📞 Please enter your contact number:".to_string(),
            ..Default::default()
        });
        w.submit_text("Other").await;
        assert_eq!(
            w.session().validation(),
            crate::validate::ValidationMode::DigitsOnly { max_len: 10 }
        );

        transport.push_ok(BackendReply {
            message: "Please describe your symptoms".to_string(),
            ..Default::default()
        });
        w.submit_text("9876543210").await;
        assert_eq!(w.session().validation(), crate::validate::ValidationMode::None);
    }
}
