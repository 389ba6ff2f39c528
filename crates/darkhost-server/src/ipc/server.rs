//! Control socket server

use std::{
    fs, io, mem,
    os::unix::fs::{FileTypeExt as _, MetadataExt as _, PermissionsExt as _},
    path::Path,
    str,
};

use relaykey::RelayKey;
use tokio::{
    io::AsyncReadExt as _,
    net::{UnixListener, UnixStream},
    select,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{Error, Handler, HostContext, Result, segments};

/// Read buffer size per connection.
const READ_BUF: usize = 4096;

/// Control socket server
pub struct ControlServer {
    socket_path: String,
    ctx: HostContext,
    relay: RelayKey,
    shutdown: CancellationToken,
}

impl ControlServer {
    /// Create a server for `socket_path` acting on the window held by `ctx`.
    pub fn new(socket_path: impl Into<String>, ctx: HostContext) -> Self {
        Self {
            socket_path: socket_path.into(),
            ctx,
            relay: RelayKey::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Use a custom key relay.
    pub fn with_relay(mut self, relay: RelayKey) -> Self {
        self.relay = relay;
        self
    }

    /// Stop serving when `token` is cancelled.
    pub fn with_shutdown(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Token that stops the server when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Path this server binds.
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Bind the socket. Must be called from within a tokio runtime.
    pub fn bind(self) -> Result<BoundServer> {
        trace!("Binding control socket: {}", self.socket_path);

        // Only directories we create get tightened to 0700; the default
        // parent is /tmp and must be left alone.
        if let Some(parent) = Path::new(&self.socket_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
            let mut perms = fs::metadata(parent)?.permissions();
            perms.set_mode(0o700);
            fs::set_permissions(parent, perms)?;
        }

        validate_or_unlink_existing_socket(&self.socket_path)?;

        let listener = UnixListener::bind(&self.socket_path)
            .map_err(|e| Error::Ipc(format!("Failed to bind to socket: {}", e)))?;
        info!("Control socket listening on {}", self.socket_path);

        let handler = Handler::new(self.ctx)
            .with_relay(self.relay)
            .with_cancel(self.shutdown.clone());
        Ok(BoundServer {
            socket_path: self.socket_path,
            listener,
            handler,
            shutdown: self.shutdown,
        })
    }

    /// Bind and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        self.bind()?.serve().await
    }
}

/// A bound control socket, ready to accept connections.
pub struct BoundServer {
    socket_path: String,
    listener: UnixListener,
    handler: Handler,
    shutdown: CancellationToken,
}

impl BoundServer {
    /// Path of the bound socket.
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Accept connections until the shutdown token fires. Accept errors are
    /// logged and the loop carries on.
    pub async fn serve(self) -> Result<()> {
        loop {
            select! {
                res = self.listener.accept() => match res {
                    Ok((stream, _addr)) => {
                        debug!("control client connected");
                        let handler = self.handler.clone();
                        let shutdown = self.shutdown.clone();
                        tokio::spawn(async move {
                            serve_connection(stream, handler, shutdown).await;
                            debug!("control client disconnected");
                        });
                    }
                    Err(e) => error!("Control socket accept failed: {}", e),
                },
                _ = self.shutdown.cancelled() => {
                    debug!("Shutdown requested; stopping control server");
                    break;
                }
            }
        }
        Ok(())
    }
}

impl Drop for BoundServer {
    fn drop(&mut self) {
        // Best-effort cleanup: only unlink if it still points to a socket owned by us.
        let _ = validate_or_unlink_existing_socket(&self.socket_path);
    }
}

/// Serve one client: echo every read back and apply the messages it holds
/// in order. Typing is awaited before the next message on this connection
/// is handled.
async fn serve_connection(stream: UnixStream, handler: Handler, shutdown: CancellationToken) {
    let (mut rd, wr) = stream.into_split();
    let mut buf = [0u8; READ_BUF];
    let mut framer = Framer::default();
    loop {
        let read = select! {
            res = rd.read(&mut buf) => res,
            _ = shutdown.cancelled() => return,
        };
        let n = match read {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Control socket error: {}", e);
                return;
            }
        };

        // Controllers are not required to read the loopback; never wait on it.
        match wr.try_write(&buf[..n]) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => trace!("echo_dropped"),
            Err(e) => trace!("Control socket echo failed: {}", e),
        }

        let text = framer.push(&buf[..n], n < READ_BUF);
        dispatch(&handler, &text).await;
    }
    dispatch(&handler, &framer.finish()).await;
}

async fn dispatch(handler: &Handler, text: &str) {
    for msg in segments(text) {
        if let Err(e) = handler.handle_message(msg).await {
            warn!(error = %e, "control_command_failed");
        }
    }
}

/// Reassembles control messages from socket reads.
///
/// Newline-terminated lines are released once their `\n` arrives, however
/// many reads they span. A read without any newline that did not fill the
/// buffer is taken as one bare, unterminated message.
#[derive(Debug, Default)]
struct Framer {
    /// Bytes received but not yet released. Never contains `\n`.
    pending: Vec<u8>,
}

impl Framer {
    /// Feed one read and return the text that is ready for parsing.
    /// `short` is true when the read did not fill the read buffer.
    fn push(&mut self, bytes: &[u8], short: bool) -> String {
        self.pending.extend_from_slice(bytes);
        match self.pending.iter().rposition(|&b| b == b'\n') {
            Some(last) => {
                let rest = self.pending.split_off(last + 1);
                let lines = mem::replace(&mut self.pending, rest);
                String::from_utf8_lossy(&lines).into_owned()
            }
            None if short => take_utf8(&mut self.pending),
            None => String::new(),
        }
    }

    /// Release everything still held; called when the client closes.
    fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}

/// Drain the decodable part of `pending`, keeping an incomplete trailing
/// sequence for the next read. Invalid bytes become U+FFFD.
fn take_utf8(pending: &mut Vec<u8>) -> String {
    let mut text = String::new();
    let mut rest: &[u8] = &pending[..];
    while !rest.is_empty() {
        match str::from_utf8(rest) {
            Ok(s) => {
                text.push_str(s);
                rest = &[];
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                text.push_str(&String::from_utf8_lossy(valid));
                match e.error_len() {
                    Some(len) => {
                        text.push(char::REPLACEMENT_CHARACTER);
                        rest = &after[len..];
                    }
                    None => {
                        rest = after;
                        break;
                    }
                }
            }
        }
    }
    let tail = rest.to_vec();
    *pending = tail;
    text
}

/// Validate that an existing path is a Unix domain socket owned by the current
/// user. If so, unlink it to make room for a new bind. If the path does not
/// exist, this is a no-op. If the path exists but is not a socket (or is not
/// owned by us), return an error and do not unlink.
fn validate_or_unlink_existing_socket(path: &str) -> Result<()> {
    match fs::symlink_metadata(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Ipc(format!(
            "Failed to lstat existing path '{}': {}",
            path, e
        ))),
        Ok(meta) => {
            let ft = meta.file_type();
            if !ft.is_socket() {
                return Err(Error::Ipc(format!(
                    "Refusing to remove non-socket at '{}': {:?}",
                    path, ft
                )));
            }
            let uid = unsafe { libc::getuid() } as u32;
            if meta.uid() != uid {
                return Err(Error::Ipc(format!(
                    "Socket at '{}' not owned by current user (uid {} != {})",
                    path,
                    meta.uid(),
                    uid
                )));
            }
            fs::remove_file(path).map_err(|e| {
                Error::Ipc(format!(
                    "Failed to remove pre-existing socket '{}': {}",
                    path, e
                ))
            })
        }
    }
}
