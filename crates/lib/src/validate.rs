//! Input gating derived from the latest assistant prompt.
//!
//! The backend asks for a contact number or a name with fixed prompt
//! phrases; the widget constrains subsequent typing accordingly. Exactly one
//! mode is active at a time (see `WidgetSession::set_validation_mode`).

/// Active input-filtering policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Free text: no filter, no length cap.
    #[default]
    None,
    /// Decimal digits only, truncated to `max_len`.
    DigitsOnly { max_len: usize },
    /// ASCII letters and spaces only, truncated to `max_len`.
    LettersAndSpacesOnly { max_len: usize },
}

const CONTACT_MAX_LEN: usize = 10;
const NAME_MAX_LEN: usize = 50;

const CONTACT_PROMPT: &str = "please enter your contact number";
const NAME_PROMPTS: [&str; 3] = [
    "please enter your full name",
    "enter your name",
    "patient name",
];

/// Derive the input mode from the text of the latest assistant turn.
/// Case-insensitive substring match; first rule wins.
pub fn mode_for_prompt(text: &str) -> ValidationMode {
    let lower = text.to_lowercase();
    if lower.contains(CONTACT_PROMPT) {
        return ValidationMode::DigitsOnly {
            max_len: CONTACT_MAX_LEN,
        };
    }
    if NAME_PROMPTS.iter().any(|p| lower.contains(p)) {
        return ValidationMode::LettersAndSpacesOnly {
            max_len: NAME_MAX_LEN,
        };
    }
    ValidationMode::None
}

impl ValidationMode {
    /// Apply the mode's filter to raw input: drop disallowed characters and
    /// truncate to the length cap. `None` returns the input unchanged.
    pub fn filter(&self, raw: &str) -> String {
        match self {
            ValidationMode::None => raw.to_string(),
            ValidationMode::DigitsOnly { max_len } => raw
                .chars()
                .filter(|c| c.is_ascii_digit())
                .take(*max_len)
                .collect(),
            ValidationMode::LettersAndSpacesOnly { max_len } => raw
                .chars()
                .filter(|c| c.is_ascii_alphabetic() || *c == ' ')
                .take(*max_len)
                .collect(),
        }
    }

    /// Length cap for the mode, if any.
    pub fn max_len(&self) -> Option<usize> {
        match self {
            ValidationMode::None => None,
            ValidationMode::DigitsOnly { max_len }
            | ValidationMode::LettersAndSpacesOnly { max_len } => Some(*max_len),
        }
    }
}
