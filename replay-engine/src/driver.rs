//! Capabilities the replay needs from the outside world: a page it can
//! type into and click on, and a clock it can wait on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// An element on the console page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A `<button>` whose text contains the label.
    Button(String),
    /// An element with the given ARIA role, e.g. `textbox`.
    Role(String),
    Css(String),
}

impl Target {
    pub fn button(label: impl Into<String>) -> Self {
        Self::Button(label.into())
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::Role(role.into())
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button(label) => write!(f, "button {label:?}"),
            Self::Role(role) => write!(f, "role={role}"),
            Self::Css(selector) => write!(f, "css={selector}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Char(char),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("Enter"),
            Self::Char(c) => write!(f, "{c}"),
        }
    }
}

/// One primitive input against the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Click(Target),
    /// Press each character of the text in turn, focus on the page body.
    Type(String),
    Press(Key),
    Fill(Target, String),
    PressOn(Target, Key),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click(target) => write!(f, "click {target}"),
            Self::Type(text) => write!(f, "type {text:?}"),
            Self::Press(key) => write!(f, "press {key}"),
            Self::Fill(target, text) => write!(f, "fill {target} with {text:?}"),
            Self::PressOn(target, key) => write!(f, "press {key} on {target}"),
        }
    }
}

/// Browser-like page the replay drives.
///
/// Implementations own element lookup and waiting semantics; the replay
/// only sequences calls.
#[async_trait]
pub trait ConsoleDriver: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Navigate to the console.
    ///
    /// # Errors
    ///
    /// Returns an error if navigation fails.
    async fn goto(&self, url: &str) -> Result<(), Self::Error>;

    /// Whether the target is displayed, waiting at most `timeout` for it.
    ///
    /// # Errors
    ///
    /// Returns an error only when the page cannot be queried; an absent
    /// element is `Ok(false)`.
    async fn is_visible(&self, target: &Target, timeout: Duration) -> Result<bool, Self::Error>;

    async fn click(&self, target: &Target) -> Result<(), Self::Error>;

    async fn fill(&self, target: &Target, text: &str) -> Result<(), Self::Error>;

    async fn type_text(&self, text: &str) -> Result<(), Self::Error>;

    async fn press(&self, key: Key) -> Result<(), Self::Error>;

    async fn press_on(&self, target: &Target, key: Key) -> Result<(), Self::Error>;

    /// Dispatch one [`Action`] to the matching primitive.
    ///
    /// # Errors
    ///
    /// Propagates the primitive's error.
    async fn perform(&self, action: &Action) -> Result<(), Self::Error> {
        match action {
            Action::Click(target) => self.click(target).await,
            Action::Type(text) => self.type_text(text).await,
            Action::Press(key) => self.press(*key).await,
            Action::Fill(target, text) => self.fill(target, text).await,
            Action::PressOn(target, key) => self.press_on(target, *key).await,
        }
    }
}

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall-clock sleeping on the tokio timer.
#[cfg(feature = "async")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[cfg(feature = "async")]
#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
