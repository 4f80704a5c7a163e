//! Subcommand implementations.
//!
//! Each module owns its clap arguments and a `run` entry point.

pub mod list;
pub mod mirror;
pub mod serve;

pub use list::ListArgs;
pub use mirror::MirrorArgs;
pub use serve::ServeArgs;
