//! Error types and result alias for the relaykey crate.
use std::result::Result as StdResult;

use thiserror::Error;

/// Crate-local `Result` alias using the relay error type.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised by a content surface while focusing or receiving input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The surface (or the window that owns it) no longer exists.
    #[error("Surface is gone")]
    SurfaceGone,
    /// The surface rejected an input event.
    #[error("Input event rejected: {0}")]
    Rejected(String),
}
