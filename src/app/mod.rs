mod console;
mod report;
mod state;
mod types;

pub use console::{ConsoleProgress, StdinPrompt};
pub use types::{App, RunSummary, Settings};
