//! Terminal user interface pieces.

mod progress;
mod prompt;

pub use progress::TerminalProgress;
pub use prompt::ConsoleConfirmer;
