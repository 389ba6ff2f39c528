//! Local control endpoint for the darkhost browser window.
//!
//! An external controller (the bot client) connects to a per-process Unix
//! socket and writes pipe-delimited text commands. Each command is parsed,
//! routed to the key relay or to a window reload, and otherwise dropped
//! without a reply.
//!
//! Public API
//! - `ControlServer`: binds the socket and serves connections until shut down.
//! - `ControlClient`: connects to a host's socket and writes commands.
//! - `Command`: the parsed form of one control message.
//! - `HostContext` / `HostWindow`: the window the endpoint acts on, swapped in
//!   and out as windows are created and closed.
//! - `socket_path_for_pid(pid)`: derives the per-process socket path.
//!
//! Conventions
//! - Per-process socket path: `<runtime dir>/darkbot_ipc_<pid>`, where the
//!   runtime dir is `$DARKHOST_RUNTIME_DIR` or `/tmp`. Several hosts can run
//!   side by side; a controller addresses one by pid.
//! - Loopback: every segment a client writes is echoed back to it. Clients
//!   must not read meaning into the reply.
//! - Errors: malformed commands are dropped silently. Socket errors are
//!   logged and never stop the server. Surface faults are logged against the
//!   command that caused them.
#![warn(missing_docs)]

use std::{env, path::PathBuf, process::id, sync::OnceLock};

mod command;
mod context;
mod error;
mod handler;
mod ipc;
#[cfg(test)]
mod test_support;

pub use command::{Command, segments};
pub use context::{HostContext, HostWindow};
pub use error::{Error, Result};
pub use handler::Handler;
pub use ipc::{BoundServer, ControlClient, ControlServer};

/// Environment variable overriding the socket directory.
pub const RUNTIME_DIR_ENV: &str = "DARKHOST_RUNTIME_DIR";

/// Return the directory used for control socket files.
///
/// Preference order:
/// - `$DARKHOST_RUNTIME_DIR`
/// - `/tmp`
fn socket_runtime_dir() -> PathBuf {
    if let Ok(dir) = env::var(RUNTIME_DIR_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    PathBuf::from("/tmp")
}

/// Socket path for the current process.
pub fn default_socket_path() -> &'static str {
    static SOCKET_PATH: OnceLock<String> = OnceLock::new();
    SOCKET_PATH.get_or_init(|| socket_path_for_pid(id()))
}

/// Compute the socket path a host with `pid` listens on. Controllers use this
/// to find a host they launched.
pub fn socket_path_for_pid(pid: u32) -> String {
    socket_runtime_dir()
        .join(format!("darkbot_ipc_{}", pid))
        .to_string_lossy()
        .to_string()
}
