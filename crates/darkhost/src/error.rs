//! Error handling for the darkhost binary.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for darkhost operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that stop the host from starting or a `send` from completing.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Errors from the control socket.
    #[error("Control socket error: {0}")]
    Server(#[from] darkhost_server::Error),
    /// The native window could not be created.
    #[error("Window error: {0}")]
    Window(#[from] tao::error::OsError),
    /// The webview could not be created or scripted.
    #[error("Webview error: {0}")]
    WebView(#[from] wry::Error),
    /// Generic error for unexpected conditions.
    #[error("{0}")]
    Other(String),
}
