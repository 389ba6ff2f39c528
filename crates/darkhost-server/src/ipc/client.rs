//! Control socket client

use tokio::{io::AsyncWriteExt as _, net::UnixStream};
use tracing::trace;

use crate::{Command, Error, Result, socket_path_for_pid};

/// A connection to a host's control socket.
pub struct ControlClient {
    socket_path: String,
    stream: UnixStream,
}

impl ControlClient {
    /// Connect to the socket at `path`.
    pub async fn connect(path: impl Into<String>) -> Result<Self> {
        let socket_path = path.into();
        let stream = UnixStream::connect(&socket_path).await.map_err(|e| {
            Error::Ipc(format!("Failed to connect to '{}': {}", socket_path, e))
        })?;
        trace!("Connected to control socket {}", socket_path);
        Ok(Self {
            socket_path,
            stream,
        })
    }

    /// Connect to the host running as process `pid`.
    pub async fn connect_pid(pid: u32) -> Result<Self> {
        Self::connect(socket_path_for_pid(pid)).await
    }

    /// Path this client is connected to.
    pub fn socket_path(&self) -> &str {
        &self.socket_path
    }

    /// Send one command, newline-terminated.
    pub async fn send(&mut self, cmd: &Command) -> Result<()> {
        self.send_raw(&format!("{cmd}\n")).await
    }

    /// Write `msg` exactly as given.
    pub async fn send_raw(&mut self, msg: &str) -> Result<()> {
        trace!(msg, "control_send");
        self.stream.write_all(msg.as_bytes()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Underlying stream, for reading the loopback.
    pub fn stream_mut(&mut self) -> &mut UnixStream {
        &mut self.stream
    }
}
