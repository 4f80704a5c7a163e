//! CLI error type.

use std::io;

use sdkmirror::MirrorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("terminal output failed: {0}")]
    Output(#[from] io::Error),
}
