//! `darkhost send`: write one control message to a running host.

use darkhost_server::{Command, ControlClient};
use tracing::{debug, warn};

use crate::{Error, Result, cli::SendArgs};

/// Connect to the target host and write `args.message` followed by a newline.
pub fn run(args: &SendArgs) -> Result<()> {
    if Command::parse(&args.message).is_none() {
        warn!(message = %args.message, "message is not a known command; the host will ignore it");
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut client = match (&args.socket, args.pid) {
            (Some(path), _) => ControlClient::connect(path.as_str()).await?,
            (None, Some(pid)) => ControlClient::connect_pid(pid).await?,
            (None, None) => return Err(Error::Other("pass --pid or --socket".into())),
        };
        debug!(socket = client.socket_path(), "sending control message");
        client.send_raw(&format!("{}\n", args.message)).await?;
        Ok(())
    })
}
