use std::{io::Error as IoError, result::Result as StdResult};

use thiserror::Error;

/// The main error type for darkhost-server operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error setting up or talking over the control socket
    #[error("IPC error: {0}")]
    Ipc(String),

    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// The hosted surface failed while receiving input or reloading
    #[error("Input relay error: {0}")]
    Relay(#[from] relaykey::Error),
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = StdResult<T, Error>;
