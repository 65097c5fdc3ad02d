//! MediChat Desktop — egui app state and UI.
//!
//! The widget itself runs on a worker thread with its own tokio runtime;
//! the UI thread sends it commands and drains its view events every frame.

use eframe::egui;
use lib::controller::ChatWidget;
use lib::options::OptionSet;
use lib::reset::ResetChoice;
use lib::transcript::{Speaker, Turn};
use lib::validate::ValidationMode;
use lib::view::TranscriptView;
use std::path::PathBuf;
use std::sync::mpsc;

const INPUT_HEIGHT: f32 = 28.0;
const BUBBLE_SPACING: f32 = 8.0;

/// Commands from the UI thread to the widget worker.
enum WidgetCommand {
    SubmitText(String),
    SubmitOption(String),
    Confirm(ResetChoice),
}

/// View events from the widget worker to the UI thread, one per
/// `TranscriptView` callback.
enum ViewEvent {
    Append(Turn),
    MountOptions(OptionSet),
    UnmountOptions,
    ShowIndicator,
    ClearIndicator,
    MountConfirmation(String, String),
    RemoveConfirmation,
    EmphasizeLast,
    SetInputEnabled(bool),
    ValidationChanged(ValidationMode),
}

/// Forwards every view callback over a channel to the UI thread.
struct ChannelView {
    tx: mpsc::Sender<ViewEvent>,
}

impl ChannelView {
    fn send(&self, ev: ViewEvent) {
        // The receiver only goes away when the window closes.
        let _ = self.tx.send(ev);
    }
}

impl TranscriptView for ChannelView {
    fn append(&mut self, turn: &Turn) {
        self.send(ViewEvent::Append(turn.clone()));
    }

    fn mount_options(&mut self, options: &OptionSet) {
        self.send(ViewEvent::MountOptions(options.clone()));
    }

    fn unmount_options(&mut self) {
        self.send(ViewEvent::UnmountOptions);
    }

    fn show_indicator(&mut self) {
        self.send(ViewEvent::ShowIndicator);
    }

    fn clear_indicator(&mut self) {
        self.send(ViewEvent::ClearIndicator);
    }

    fn mount_confirmation_controls(&mut self, confirm_label: &str, cancel_label: &str) {
        self.send(ViewEvent::MountConfirmation(
            confirm_label.to_string(),
            cancel_label.to_string(),
        ));
    }

    fn remove_confirmation_controls(&mut self) {
        self.send(ViewEvent::RemoveConfirmation);
    }

    fn emphasize_last(&mut self) {
        self.send(ViewEvent::EmphasizeLast);
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.send(ViewEvent::SetInputEnabled(enabled));
    }

    fn validation_changed(&mut self, mode: ValidationMode) {
        self.send(ViewEvent::ValidationChanged(mode));
    }
}

/// Run the widget on a dedicated thread: open it, then process commands
/// until the UI drops its sender.
fn spawn_widget_worker(
    config: lib::config::Config,
) -> (mpsc::Sender<WidgetCommand>, mpsc::Receiver<ViewEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<WidgetCommand>();
    let (event_tx, event_rx) = mpsc::channel::<ViewEvent>();

    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("desktop: failed to start runtime: {}", e);
                return;
            }
        };
        let backend = match lib::backend::HttpChatBackend::from_config(&config) {
            Ok(b) => b,
            Err(e) => {
                log::error!("desktop: failed to build backend client: {}", e);
                return;
            }
        };
        log::info!("desktop: using backend {}", backend.base_url());

        let mut widget = ChatWidget::new(backend, ChannelView { tx: event_tx });
        widget.open();

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                WidgetCommand::SubmitText(text) => rt.block_on(widget.submit_text(&text)),
                WidgetCommand::SubmitOption(value) => rt.block_on(widget.submit_option(&value)),
                WidgetCommand::Confirm(choice) => rt.block_on(widget.resolve_confirmation(choice)),
            }
        }
    });

    (cmd_tx, event_rx)
}

/// One rendered transcript bubble.
struct Bubble {
    speaker: Speaker,
    text: String,
    is_error: bool,
    emphasized: bool,
}

pub struct MediChatApp {
    cmd_tx: mpsc::Sender<WidgetCommand>,
    event_rx: mpsc::Receiver<ViewEvent>,
    bubbles: Vec<Bubble>,
    /// Options mounted under the latest assistant bubble.
    options: Option<OptionSet>,
    /// Confirm/cancel labels of the pending reset confirmation.
    confirmation: Option<(String, String)>,
    indicator_visible: bool,
    input_enabled: bool,
    focus_input: bool,
    input: String,
    validation: ValidationMode,
    dark_theme: bool,
    config: lib::config::Config,
    config_path: PathBuf,
}

impl MediChatApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let (config, config_path) = lib::config::load_config(None).unwrap_or_else(|e| {
            log::warn!("desktop: config load failed, using defaults: {}", e);
            (lib::config::Config::default(), lib::config::default_config_path())
        });
        let dark_theme = config.ui.theme.as_deref() != Some("light");
        let (cmd_tx, event_rx) = spawn_widget_worker(config.clone());
        Self {
            cmd_tx,
            event_rx,
            bubbles: Vec::new(),
            options: None,
            confirmation: None,
            indicator_visible: false,
            input_enabled: false,
            focus_input: false,
            input: String::new(),
            validation: ValidationMode::None,
            dark_theme,
            config,
            config_path,
        }
    }

    /// Drain pending view events into UI state. Call each frame.
    fn poll_events(&mut self) {
        while let Ok(ev) = self.event_rx.try_recv() {
            match ev {
                ViewEvent::Append(turn) => self.bubbles.push(Bubble {
                    speaker: turn.speaker,
                    text: turn.text,
                    is_error: turn.is_error,
                    emphasized: false,
                }),
                ViewEvent::MountOptions(set) => self.options = Some(set),
                ViewEvent::UnmountOptions => self.options = None,
                ViewEvent::ShowIndicator => self.indicator_visible = true,
                ViewEvent::ClearIndicator => self.indicator_visible = false,
                ViewEvent::MountConfirmation(confirm, cancel) => {
                    self.confirmation = Some((confirm, cancel));
                }
                ViewEvent::RemoveConfirmation => self.confirmation = None,
                ViewEvent::EmphasizeLast => {
                    if let Some(last) = self.bubbles.last_mut() {
                        last.emphasized = true;
                    }
                }
                ViewEvent::SetInputEnabled(enabled) => {
                    self.input_enabled = enabled;
                    if enabled {
                        self.focus_input = true;
                    }
                }
                ViewEvent::ValidationChanged(mode) => self.validation = mode,
            }
        }
    }

    fn send_command(&self, cmd: WidgetCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("desktop: widget worker is gone");
        }
    }

    fn submit_input(&mut self) {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return;
        }
        self.input.clear();
        self.send_command(WidgetCommand::SubmitText(text));
    }

    fn toggle_theme(&mut self) {
        self.dark_theme = !self.dark_theme;
        self.config.ui.theme = Some(if self.dark_theme { "dark" } else { "light" }.to_string());
        if let Err(e) = lib::config::save_config(&self.config, &self.config_path) {
            log::warn!("desktop: failed to save theme preference: {}", e);
        }
    }

    fn render_bubble(ui: &mut egui::Ui, bubble: &Bubble) {
        let is_user = bubble.speaker == Speaker::User;
        let fill = if is_user {
            ui.style().visuals.extreme_bg_color
        } else {
            ui.style().visuals.panel_fill
        };
        let stroke = if bubble.is_error {
            egui::Stroke::new(1.0, egui::Color32::RED)
        } else if bubble.emphasized {
            egui::Stroke::new(2.0, egui::Color32::from_rgb(0x2e, 0x7d, 0x32))
        } else {
            egui::Stroke::new(
                1.0,
                ui.style().visuals.widgets.noninteractive.bg_stroke.color,
            )
        };

        let layout = if is_user {
            egui::Layout::right_to_left(egui::Align::Min)
        } else {
            egui::Layout::left_to_right(egui::Align::Min)
        };
        ui.with_layout(layout, |ui| {
            egui::Frame::none()
                .fill(fill)
                .stroke(stroke)
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(8.0))
                .show(ui, |ui| {
                    ui.set_max_width(ui.available_width() * 0.8);
                    if bubble.is_error {
                        ui.colored_label(egui::Color32::RED, &bubble.text);
                    } else if bubble.emphasized {
                        ui.label(egui::RichText::new(&bubble.text).strong());
                    } else {
                        ui.label(&bubble.text);
                    }
                });
        });
    }

    /// Option buttons under the latest assistant bubble. Clicking one sends
    /// its submit value; the worker unmounts the set when the turn starts.
    fn render_options(&mut self, ui: &mut egui::Ui) {
        let Some(set) = self.options.clone() else { return };
        ui.add_space(BUBBLE_SPACING);
        let horizontal = matches!(set.layout_hint, "menu" | "row" | "grid");
        let mut clicked: Option<String> = None;
        let mut render_items = |ui: &mut egui::Ui| {
            for item in &set.items {
                let text = match &item.subtitle {
                    Some(sub) => format!("{}\n{}", item.label, sub),
                    None => item.label.clone(),
                };
                if ui
                    .add_enabled(self.input_enabled, egui::Button::new(text))
                    .clicked()
                {
                    clicked = Some(item.value.clone());
                }
            }
        };
        if horizontal {
            ui.horizontal_wrapped(render_items);
        } else {
            ui.vertical(render_items);
        }
        if let Some(value) = clicked {
            self.send_command(WidgetCommand::SubmitOption(value));
        }
    }

    fn render_confirmation(&mut self, ui: &mut egui::Ui) {
        let Some((confirm, cancel)) = self.confirmation.clone() else { return };
        ui.add_space(BUBBLE_SPACING);
        let mut choice: Option<ResetChoice> = None;
        ui.horizontal(|ui| {
            if ui.button(&confirm).clicked() {
                choice = Some(ResetChoice::GoToMenu);
            }
            if ui.button(&cancel).clicked() {
                choice = Some(ResetChoice::Continue);
            }
        });
        if let Some(choice) = choice {
            self.send_command(WidgetCommand::Confirm(choice));
        }
    }

    fn render_input_row(&mut self, ui: &mut egui::Ui) {
        // Keystrokes pass through the active filter before they are shown,
        // so disallowed characters never appear in the field.
        let filtered = self.validation.filter(&self.input);
        if filtered != self.input {
            self.input = filtered;
        }

        let mut send_now = false;
        ui.horizontal(|ui| {
            let send_width = 60.0;
            let field_width = (ui.available_width() - send_width - 8.0).max(80.0);
            let response = ui.add_enabled(
                self.input_enabled,
                egui::TextEdit::singleline(&mut self.input)
                    .desired_width(field_width)
                    .min_size(egui::vec2(field_width, INPUT_HEIGHT))
                    .hint_text("Type your message..."),
            );
            if self.focus_input && self.input_enabled {
                response.request_focus();
                self.focus_input = false;
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }
            if ui
                .add_enabled(self.input_enabled, egui::Button::new("Send"))
                .clicked()
            {
                send_now = true;
            }
        });
        if send_now && self.input_enabled {
            self.submit_input();
        }
    }
}

impl eframe::App for MediChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_events();
        ctx.set_visuals(if self.dark_theme {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading("🏥 MediChat");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if self.dark_theme { "☀ Light" } else { "🌙 Dark" };
                    if ui.button(label).clicked() {
                        self.toggle_theme();
                    }
                });
            });
            ui.add_space(8.0);
        });

        egui::TopBottomPanel::bottom("input").show(ctx, |ui| {
            ui.add_space(8.0);
            self.render_input_row(ui);
            ui.add_space(8.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    // Keep scroll content at viewport width so the scrollbar
                    // stays on the right.
                    ui.allocate_exact_size(
                        egui::vec2(ui.available_width(), 0.0),
                        egui::Sense::hover(),
                    );
                    for bubble in &self.bubbles {
                        Self::render_bubble(ui, bubble);
                        ui.add_space(BUBBLE_SPACING);
                    }
                    if self.indicator_visible {
                        ui.label(egui::RichText::new("●●●").weak());
                        ui.add_space(BUBBLE_SPACING);
                    }
                    self.render_options(ui);
                    self.render_confirmation(ui);
                });
        });

        // Worker events arrive between frames; keep polling at ~10 Hz even
        // when idle.
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
