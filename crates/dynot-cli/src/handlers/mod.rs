pub mod factories;
pub mod settings;
pub mod span;
pub mod validate;

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

/// Green status marker, uncolored when stdout is not a terminal
pub(crate) fn ok_marker(text: &str) -> String {
    if std::io::stdout().is_terminal() {
        format!("{}", text.green().bold())
    } else {
        text.to_string()
    }
}

pub(crate) fn heading(text: &str) -> String {
    if std::io::stdout().is_terminal() {
        format!("{}", text.cyan().bold())
    } else {
        text.to_string()
    }
}
