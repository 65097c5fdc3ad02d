use clap::{Parser, Subcommand};
use lib::controller::ChatWidget;
use lib::options::OptionSet;
use lib::reset::ResetChoice;
use lib::transcript::{Speaker, Turn};
use lib::validate::ValidationMode;
use lib::view::TranscriptView;

#[derive(Parser)]
#[command(name = "medichat")]
#[command(about = "MediChat CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Chat with the booking backend (interactive). Options are selected by
    /// typing their number or their exact label.
    Chat {
        /// Config file path (default: MEDICHAT_CONFIG_PATH or ~/.medichat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Backend base URL (overrides config and MEDICHAT_BACKEND_URL)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("medichat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Chat { config, url }) => {
            if let Err(e) = run_chat(config, url).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

/// Terminal renderer: prints turns and option lists as they happen and keeps
/// a copy of the live options so the input loop can map numbers to values.
#[derive(Default)]
struct TerminalView {
    options: Option<OptionSet>,
    confirmation: Option<(String, String)>,
}

impl TranscriptView for TerminalView {
    fn append(&mut self, turn: &Turn) {
        let prefix = match (turn.speaker, turn.is_error) {
            (Speaker::User, _) => "you",
            (Speaker::Assistant, false) => "bot",
            (Speaker::Assistant, true) => "err",
        };
        for (i, line) in turn.text.lines().enumerate() {
            if i == 0 {
                println!("{}> {}", prefix, line);
            } else {
                println!("     {}", line);
            }
        }
    }

    fn mount_options(&mut self, options: &OptionSet) {
        for (i, item) in options.items.iter().enumerate() {
            match &item.subtitle {
                Some(sub) => println!("  [{}] {} ({})", i + 1, item.label, sub),
                None => println!("  [{}] {}", i + 1, item.label),
            }
        }
        self.options = Some(options.clone());
    }

    fn unmount_options(&mut self) {
        self.options = None;
    }

    fn show_indicator(&mut self) {
        println!("  ...");
    }

    fn clear_indicator(&mut self) {}

    fn mount_confirmation_controls(&mut self, confirm_label: &str, cancel_label: &str) {
        println!("  [1] {}", confirm_label);
        println!("  [2] {}", cancel_label);
        self.confirmation = Some((confirm_label.to_string(), cancel_label.to_string()));
    }

    fn remove_confirmation_controls(&mut self) {
        self.confirmation = None;
    }

    fn set_input_enabled(&mut self, _enabled: bool) {}

    fn validation_changed(&mut self, mode: ValidationMode) {
        match mode {
            ValidationMode::DigitsOnly { max_len } => {
                println!("  (digits only, up to {} characters)", max_len);
            }
            ValidationMode::LettersAndSpacesOnly { max_len } => {
                println!("  (letters and spaces only, up to {} characters)", max_len);
            }
            ValidationMode::None => {}
        }
    }
}

/// Map typed input to the confirmation choice, if one is pending.
fn confirmation_choice(input: &str, confirm_label: &str, cancel_label: &str) -> Option<ResetChoice> {
    if input == "1" || input.eq_ignore_ascii_case(confirm_label) || input.eq_ignore_ascii_case("yes") {
        return Some(ResetChoice::GoToMenu);
    }
    if input == "2" || input.eq_ignore_ascii_case(cancel_label) || input.eq_ignore_ascii_case("no") {
        return Some(ResetChoice::Continue);
    }
    None
}

/// Map typed input to a mounted option's submit value: its 1-based number,
/// or its exact label or value (case-insensitive).
fn option_value(input: &str, options: &OptionSet) -> Option<String> {
    if let Ok(n) = input.parse::<usize>() {
        if n >= 1 && n <= options.items.len() {
            return Some(options.items[n - 1].value.clone());
        }
    }
    options
        .items
        .iter()
        .find(|item| {
            item.label.eq_ignore_ascii_case(input) || item.value.eq_ignore_ascii_case(input)
        })
        .map(|item| item.value.clone())
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = lib::config::load_config(config_path)?;
    let backend = match url {
        Some(u) => lib::backend::HttpChatBackend::new(Some(u)),
        None => lib::backend::HttpChatBackend::from_config(&config)?,
    };
    log::info!("chat: using backend {}", backend.base_url());

    let mut widget = ChatWidget::new(backend, TerminalView::default());
    widget.open();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        if let Some((confirm, cancel)) = widget.view().confirmation.clone() {
            match confirmation_choice(input, &confirm, &cancel) {
                Some(choice) => widget.resolve_confirmation(choice).await,
                None => println!("  (choose 1 or 2)"),
            }
            continue;
        }

        if let Some(value) = widget
            .view()
            .options
            .as_ref()
            .and_then(|set| option_value(input, set))
        {
            widget.submit_option(&value).await;
            continue;
        }

        // Typed input passes through the active filter, like keystrokes in
        // the widget's text field.
        let filtered = widget.session().validation().filter(input);
        if filtered != input {
            println!("  (input filtered to: {:?})", filtered);
        }
        widget.submit_text(&filtered).await;
    }

    Ok(())
}
