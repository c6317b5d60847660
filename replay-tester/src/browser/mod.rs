pub mod console;
pub mod session;

pub use console::WebDriverConsole;
pub use session::{BrowserConfig, BrowserKind, new_session};
