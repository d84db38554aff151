//! Error type shared by the viewer and its terminal backends.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Terminal too small: {cols}x{rows} (need at least {min_cols}x{min_rows})")]
    TerminalTooSmall {
        cols: u16,
        rows: u16,
        min_cols: u16,
        min_rows: u16,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
