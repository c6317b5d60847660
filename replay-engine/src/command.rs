//! The console's input protocol.
//!
//! The console has no API: it switches modes when it sees marker strings
//! typed into the page. [`ConsoleCommand`] names those switches and
//! [`Keymap`] is the single table that turns them into keystrokes.

use serde::{Deserialize, Serialize};

use crate::driver::{Action, Key};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConsoleCommand {
    EnterEditMode,
    EnterResultMode,
    EnterShoeChangeMode,
    Confirm,
    /// Splits the result code from the banker and player totals.
    Separator,
    TypeDigits(String),
}

impl ConsoleCommand {
    /// Mode switches; the console needs longer to react to these.
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(
            self,
            Self::EnterEditMode | Self::EnterResultMode | Self::EnterShoeChangeMode
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keymap {
    pub edit_mode: String,
    pub result_mode: String,
    pub shoe_change_mode: String,
    pub separator: char,
    pub confirm: Key,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            edit_mode: "**".to_string(),
            result_mode: "//".to_string(),
            shoe_change_mode: "++".to_string(),
            separator: '.',
            confirm: Key::Enter,
        }
    }
}

impl Keymap {
    #[must_use]
    pub fn action(&self, command: &ConsoleCommand) -> Action {
        match command {
            ConsoleCommand::EnterEditMode => Action::Type(self.edit_mode.clone()),
            ConsoleCommand::EnterResultMode => Action::Type(self.result_mode.clone()),
            ConsoleCommand::EnterShoeChangeMode => Action::Type(self.shoe_change_mode.clone()),
            ConsoleCommand::Confirm => Action::Press(self.confirm),
            ConsoleCommand::Separator => Action::Press(Key::Char(self.separator)),
            ConsoleCommand::TypeDigits(digits) => Action::Type(digits.clone()),
        }
    }
}
